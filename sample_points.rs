use anyhow::{bail, Context};
use mask_points::{
    AttributeArray, AttributeData, CollectiveTransport, LocalCluster, MaskPoints, PointData,
    PointSet, Positions, Random, RandomSource, SampleConfig, SampleReport,
};
use ndarray::Array2;
use std::thread;

/// Usage: sample_points [CONFIG.json|CONFIG.toml|-] [POINTS] [RANKS]
///
/// Without a config file (or with `-`) the configuration is read from
/// `MASK_POINTS_*` environment variables.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first().map(String::as_str) {
        None | Some("-") => SampleConfig::load_from_environment()?,
        Some(path) => SampleConfig::load_from_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
    };
    let points: usize = match args.get(1) {
        Some(value) => value.parse().context("POINTS must be a non-negative integer")?,
        None => 100_000,
    };
    let ranks: usize = match args.get(2) {
        Some(value) => value.parse().context("RANKS must be a positive integer")?,
        None => 1,
    };
    if ranks == 0 {
        bail!("RANKS must be at least 1");
    }

    log::info!(
        "Sampling {} points on {} rank(s) with {:?}",
        points,
        ranks,
        config
    );

    let reports = if ranks == 1 {
        let input = point_cloud(points, config.seed.unwrap_or(0))?;
        vec![MaskPoints::new(config).execute(&input)?.report]
    } else {
        run_cluster(&config, points, ranks)?
    };

    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}

/// Run one engine per thread. Rank `r` owns a share of the points that
/// grows with `r`, so rank 0 is empty whenever there are several ranks.
fn run_cluster(config: &SampleConfig, points: usize, ranks: usize) -> anyhow::Result<Vec<SampleReport>> {
    let weight_total: usize = (0..ranks).sum();
    thread::scope(|scope| {
        let handles: Vec<_> = LocalCluster::new(ranks)
            .transports()
            .into_iter()
            .map(|transport| {
                let rank = transport.rank();
                let local = points * rank / weight_total.max(1);
                let config = config.clone();
                scope.spawn(move || -> anyhow::Result<SampleReport> {
                    let seed = config.seed.unwrap_or(0) ^ rank as u64;
                    let input = point_cloud(local, seed)?;
                    let output = MaskPoints::with_transport(config, transport).execute(&input)?;
                    Ok(output.report)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(report) => report,
                Err(_) => bail!("sampling thread panicked"),
            })
            .collect()
    })
}

/// Uniform points in the unit cube with an id and an intensity attribute.
fn point_cloud(n: usize, seed: u64) -> mask_points::Result<PointSet> {
    let mut rng = Random::with_seed(seed);
    let coordinates: Vec<[f64; 3]> = (0..n)
        .map(|_| [rng.next_uniform(), rng.next_uniform(), rng.next_uniform()])
        .collect();

    let mut data = PointData::new();
    data.add_array(AttributeArray::new(
        "id",
        AttributeData::I64(Array2::from_shape_fn((n, 1), |(i, _)| i as i64)),
    ));
    data.add_array(AttributeArray::new(
        "intensity",
        AttributeData::F32(Array2::from_shape_fn((n, 1), |(i, _)| {
            coordinates[i][2] as f32
        })),
    ));
    PointSet::new(Positions::from_points(&coordinates), data)
}
