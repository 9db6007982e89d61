//! Multi-rank runs over an in-process cluster.

mod common;

use common::*;
use mask_points::*;
use std::thread;
use std::time::Duration;

/// Run `populations.len()` engines, one per thread, rank `r` sampling
/// `populations[r]` points. Reports are returned in world-rank order.
fn run_ranks(config: &SampleConfig, populations: &[usize]) -> Vec<SampleOutput> {
    let transports = LocalCluster::new(populations.len())
        .with_timeout(Duration::from_secs(30))
        .transports();
    thread::scope(|scope| {
        let handles: Vec<_> = transports
            .into_iter()
            .zip(populations)
            .map(|(transport, &n)| {
                let config = config.clone();
                scope.spawn(move || {
                    let rank = transport.world_rank() as u64;
                    let input = create_point_cloud(n, 100 + rank);
                    let config = SampleConfig {
                        seed: config.seed.map(|s| s + rank),
                        ..config
                    };
                    MaskPoints::with_transport(config, transport)
                        .execute(&input)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

fn proportional(mode: SamplingMode, max_count: u64) -> SampleConfig {
    ConfigBuilder::new()
        .mode(mode)
        .stride(1)
        .max_count(max_count)
        .proportional_across_ranks(true)
        .seed(7)
        .build()
}

#[test]
fn test_two_ranks_split_in_proportion() {
    init_logging();
    let outputs = run_ranks(&proportional(SamplingMode::Reservoir, 40), &[100, 300]);
    assert_eq!(outputs[0].report.requested, 10);
    assert_eq!(outputs[1].report.requested, 30);
    assert_eq!(outputs[0].points.len(), 10);
    assert_eq!(outputs[1].points.len(), 30);
    assert_eq!(outputs[0].report.global_selected, Some(40));
    assert_eq!(outputs[1].report.global_selected, None);
}

#[test]
fn test_quotas_sum_to_global_target() {
    let populations = [17, 250, 3, 999, 64];
    for mode in SamplingMode::ALL {
        let outputs = run_ranks(&proportional(mode, 101), &populations);
        let total: usize = outputs.iter().map(|o| o.report.requested).sum();
        assert_eq!(total, 101, "{mode}");
        for (output, &n) in outputs.iter().zip(&populations) {
            assert!(output.report.requested <= n);
            let exact = n as f64 * 101.0 / populations.iter().sum::<usize>() as f64;
            assert!((output.report.requested as f64 - exact).abs() < 1.0);
        }
    }
}

#[test]
fn test_target_above_total_takes_everything() {
    let outputs = run_ranks(&proportional(SamplingMode::Stratified, 10_000), &[5, 12, 30]);
    let sizes: Vec<usize> = outputs.iter().map(|o| o.points.len()).collect();
    assert_eq!(sizes, vec![5, 12, 30]);
    assert_eq!(outputs[0].report.global_selected, Some(47));
}

#[test]
fn test_empty_ranks_do_not_stall_summary() {
    // rank 0 is empty, so the coordinator of the participating group is rank 1
    let outputs = run_ranks(&proportional(SamplingMode::Reservoir, 30), &[0, 60, 0, 30]);
    assert_eq!(outputs[0].points.len(), 0);
    assert_eq!(outputs[2].points.len(), 0);
    assert_eq!(outputs[1].points.len(), 20);
    assert_eq!(outputs[3].points.len(), 10);
    assert_eq!(outputs[0].report.global_selected, None);
    assert_eq!(outputs[1].report.global_selected, Some(30));
    assert_eq!(outputs[3].report.global_selected, None);
}

#[test]
fn test_all_ranks_empty() {
    let outputs = run_ranks(&proportional(SamplingMode::Stride, 30), &[0, 0, 0]);
    assert!(outputs.iter().all(|o| o.points.is_empty()));
    // the empty ranks form their own group and never gather
    assert!(outputs.iter().all(|o| o.report.global_selected.is_none()));
}

#[test]
fn test_local_max_count_without_proportional() {
    let config = ConfigBuilder::new()
        .stride(1)
        .max_count(25)
        .build();
    let outputs = run_ranks(&config, &[100, 10, 40]);
    let sizes: Vec<usize> = outputs.iter().map(|o| o.points.len()).collect();
    assert_eq!(sizes, vec![25, 10, 25]);
    assert_eq!(outputs[0].report.global_selected, Some(60));
}

#[test]
fn test_repeated_executions_stay_in_step() {
    let populations = [0usize, 40, 80];
    let transports = LocalCluster::new(3)
        .with_timeout(Duration::from_secs(30))
        .transports();
    let config = proportional(SamplingMode::Jittered, 12);
    let totals: Vec<Vec<Option<u64>>> = thread::scope(|scope| {
        let handles: Vec<_> = transports
            .into_iter()
            .zip(populations)
            .map(|(transport, n)| {
                let config = config.clone();
                scope.spawn(move || {
                    let input = create_point_cloud(n, 1);
                    let mut engine = MaskPoints::with_transport(config, transport);
                    (0..3)
                        .map(|_| engine.execute(&input).unwrap().report.global_selected)
                        .collect()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(totals[0].iter().all(Option::is_none));
    assert!(totals[2].iter().all(Option::is_none));
    assert_eq!(totals[1].len(), 3);
    for total in &totals[1] {
        assert!(total.is_some_and(|t| t <= 12));
    }
}

#[test]
fn test_transport_timeout_surfaces_as_error() {
    // only one of two ranks calls in
    let mut transports = LocalCluster::new(2)
        .with_timeout(Duration::from_millis(50))
        .transports();
    let transport = transports.remove(0);
    let config = proportional(SamplingMode::Reservoir, 10);
    let err = MaskPoints::with_transport(config, transport)
        .execute(&create_point_cloud(20, 1))
        .unwrap_err();
    assert_eq!(err.category(), "transport");
}
