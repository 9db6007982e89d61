use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mask_points::sampling::{ReservoirSampler, StratifiedSampler, StrideSelector};
use mask_points::*;

/// Uniform points in the unit cube
fn generate_positions(n: usize) -> Positions {
    let mut rng = Random::with_seed(42);
    let points: Vec<[f64; 3]> = (0..n)
        .map(|_| [rng.next_uniform(), rng.next_uniform(), rng.next_uniform()])
        .collect();
    Positions::from_points(&points)
}

fn bench_stride(c: &mut Criterion) {
    let mut rng = Random::with_seed(1);
    c.bench_function("stride/1M_every_10th", |b| {
        b.iter(|| StrideSelector::new(10, 0, usize::MAX).select(black_box(1_000_000), &NeverAbort))
    });
    c.bench_function("jittered/1M_every_10th", |b| {
        b.iter(|| {
            StrideSelector::new(10, 0, usize::MAX).select_jittered(
                black_box(1_000_000),
                &mut rng,
                &NeverAbort,
            )
        })
    });
}

fn bench_reservoir(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservoir");
    let mut rng = Random::with_seed(2);
    for k in [100, 10_000, 500_000] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| black_box(ReservoirSampler::new(1_000_000, k).sample(&mut rng)))
        });
    }
    group.finish();
}

fn bench_stratified(c: &mut Criterion) {
    let mut group = c.benchmark_group("stratified");
    let mut rng = Random::with_seed(3);
    for n in [10_000, 100_000] {
        let positions = generate_positions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &positions, |b, p| {
            b.iter(|| black_box(StratifiedSampler::new(p).sample(n / 100, &mut rng)))
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let positions = generate_positions(200_000);
    let input = PointSet::from_positions(positions).unwrap();
    let config = ConfigBuilder::new()
        .mode(SamplingMode::Reservoir)
        .max_count(20_000)
        .seed(4)
        .build();
    let mut engine = MaskPoints::new(config);
    c.bench_function("engine/reservoir_200k_to_20k", |b| {
        b.iter(|| black_box(engine.execute(&input).unwrap().report.selected))
    });
}

criterion_group!(
    benches,
    bench_stride,
    bench_reservoir,
    bench_stratified,
    bench_engine
);
criterion_main!(benches);
