//! End-to-end invariants over full simulation runs: ordering of recorded
//! timestamps, block-capacity limits, fee-priority selection, the
//! recording window, reproducibility, and the degenerate-generator
//! failure mode.

use bq_core::process::{Map, Ph, PhLabel};
use bq_core::rng::{stream_index, StreamPool};
use bq_core::scheduler::{MapPhScheduler, MmScheduler, Scheduler};
use bq_core::sim::{FeeSource, QueueConfig, QueueSimulator};
use bq_core::stats;

fn mm1_config(b: usize, sigma: f64, tau: f64, upsilon: f64, fees: bool) -> QueueConfig {
    QueueConfig {
        b,
        sigma,
        tau,
        upsilon,
        fees,
    }
}

fn mm1_scheduler(seed: u64, lambda: f64, mu1: f64, mu2: f64) -> MmScheduler {
    let pool = StreamPool::new(seed);
    MmScheduler::new(
        lambda,
        mu1,
        mu2,
        pool.stream(stream_index::MM_ARRIVAL),
        pool.stream(stream_index::MM_SELECTION),
        pool.stream(stream_index::MM_MINING),
    )
}

#[test]
fn recorded_transactions_respect_arrival_selection_mining_order() {
    let pool = StreamPool::new(42);
    let scheduler = mm1_scheduler(42, 0.7, 10.0, 590.0);
    let config = mm1_config(1000, 0.0, 2e4, 600.0, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    assert!(!output.transactions.is_empty());
    for tx in &output.transactions {
        if let Some(selection) = tx.selection {
            assert!(tx.arrival <= selection);
            if let Some(mining) = tx.mining {
                assert!(selection <= mining);
            }
        }
    }
    for block in &output.blocks {
        assert!(block.size <= 1000);
        if let Some(mining) = block.mining {
            assert!(block.selection <= mining);
        }
    }
}

#[test]
fn selected_volume_covers_recorded_transactions() {
    let pool = StreamPool::new(42);
    let scheduler = mm1_scheduler(42, 0.7, 10.0, 590.0);
    let config = mm1_config(1000, 0.0, 2e4, 600.0, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    let total_block_size: usize = output.blocks.iter().map(|b| b.size).sum();
    let selected_recorded = output
        .transactions
        .iter()
        .filter(|tx| tx.selection.is_some())
        .count();
    assert!(total_block_size >= selected_recorded);
}

#[test]
fn same_seed_is_byte_identical() {
    let run = |seed: u64| {
        let pool = StreamPool::new(seed);
        let scheduler = mm1_scheduler(seed, 0.7, 10.0, 590.0);
        let config = mm1_config(1000, 0.0, 1e4, 600.0, false);
        let simulator =
            QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
        simulator.run().unwrap()
    };

    let a = run(7);
    let b = run(7);

    assert_eq!(a.transactions.len(), b.transactions.len());
    assert_eq!(a.blocks.len(), b.blocks.len());
    for (ta, tb) in a.transactions.iter().zip(b.transactions.iter()) {
        assert_eq!(ta.arrival, tb.arrival);
        assert_eq!(ta.selection, tb.selection);
        assert_eq!(ta.mining, tb.mining);
    }
    for (ba, bb) in a.blocks.iter().zip(b.blocks.iter()) {
        assert_eq!(ba.size, bb.size);
        assert_eq!(ba.selection, bb.selection);
        assert_eq!(ba.mining, bb.mining);
    }
}

#[test]
fn unstable_queue_grows_the_mempool_without_bound() {
    let pool = StreamPool::new(42);
    let scheduler = mm1_scheduler(42, 1e-3, 10.0, 590.0);
    let config = mm1_config(1000, 0.0, 3e4, 600.0, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    let last_room = output.room_states.last().map(|r| r.size).unwrap_or(0);
    // arrivals (mean interarrival 1e-3) vastly outpace service (mu1+mu2 ~ 600),
    // so even at this reduced tau the mempool should already be well past 1e5.
    assert!(last_room > 100_000, "expected unbounded growth, got {last_room}");
}

fn fixture_map_ph(seed: u64) -> MapPhScheduler {
    let pool = StreamPool::new(seed);
    let c = vec![vec![-1.3, 0.3], vec![0.5, -1.5]];
    let d = vec![vec![0.05, 0.95], vec![0.15, 0.85]];
    let omega = vec![0.5, 0.5];
    let s = vec![vec![-0.1, 0.08], vec![0.06, -0.1]];
    let beta = vec![0.5, 0.5];
    let t = vec![vec![-0.2, 0.1], vec![0.1, -0.2]];
    let alpha = vec![0.5, 0.5];

    let map = Map::new(&mut pool.stream(stream_index::MAP_INIT), c, d, omega).unwrap();
    let selection = Ph::new(
        &mut pool.stream(stream_index::SELECTION_PH_INIT),
        s,
        beta,
        PhLabel::Selection,
    )
    .unwrap();
    let mining = Ph::new(
        &mut pool.stream(stream_index::MINING_PH_INIT),
        t,
        alpha,
        PhLabel::Mining,
    )
    .unwrap();

    MapPhScheduler::new(map, selection, mining, pool.stream(stream_index::MAP_PH_SCHEDULER))
}

#[test]
fn map_ph_produces_arrivals_and_alternating_blocks() {
    let pool = StreamPool::new(7);
    let scheduler = fixture_map_ph(7);
    let config = mm1_config(50, 0.0, 2e3, 50.0, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MAPPH1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    assert!(!output.transactions.is_empty());
    assert!(!output.blocks.is_empty());
    for block in &output.blocks {
        if let Some(mining) = block.mining {
            assert!(mining - block.selection > 0.0);
        }
    }
}

#[test]
fn degenerate_generators_fail_fast() {
    let pool = StreamPool::new(9);
    let zero2 = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
    let omega = vec![0.5, 0.5];

    let map = Map::new(&mut pool.stream(0), zero2.clone(), zero2.clone(), omega.clone()).unwrap();
    let selection = Ph::new(&mut pool.stream(1), zero2.clone(), omega.clone(), PhLabel::Selection).unwrap();
    let mining = Ph::new(&mut pool.stream(2), zero2, omega, PhLabel::Mining).unwrap();
    let mut scheduler = MapPhScheduler::new(map, selection, mining, pool.stream(3));

    assert!(scheduler.next().is_err());
}

#[test]
fn fee_priority_blocks_outrank_the_remaining_mempool() {
    let pool = StreamPool::new(13);
    let scheduler = mm1_scheduler(13, 5.0, 10.0, 590.0);
    let config = mm1_config(20, 0.0, 2e4, 600.0, true);
    let fees = FeeSource::Discrete(vec![1.0, 2.0, 5.0]);
    let simulator = QueueSimulator::new(
        scheduler,
        config,
        pool.stream(stream_index::MM1_SIMULATOR),
        Some(fees),
    );
    let output = simulator.run().unwrap();

    let full_blocks: Vec<_> = output.blocks.iter().filter(|b| b.size == 20).collect();
    assert!(!full_blocks.is_empty(), "expected at least one full block at this load");

    for block in &full_blocks {
        let min_in_block = output
            .transactions
            .iter()
            .filter(|tx| tx.selection == Some(block.selection))
            .map(|tx| tx.fee)
            .fold(f64::INFINITY, f64::min);

        let max_in_mempool = output
            .transactions
            .iter()
            .filter(|tx| {
                tx.arrival <= block.selection
                    && (tx.selection.is_none() || tx.selection > Some(block.selection))
            })
            .map(|tx| tx.fee)
            .fold(f64::NEG_INFINITY, f64::max);

        if max_in_mempool.is_finite() {
            assert!(
                min_in_block >= max_in_mempool,
                "block min fee {min_in_block} below post-selection mempool max {max_in_mempool}"
            );
        }
    }
}

#[test]
fn recorded_transactions_stay_within_the_window() {
    let pool = StreamPool::new(5);
    let tau = 1e4;
    let sigma = 0.5 * tau;
    let upsilon = 0.1 * tau;
    let scheduler = mm1_scheduler(5, 0.7, 10.0, 590.0);
    let config = mm1_config(1000, sigma, tau, upsilon, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    for tx in &output.transactions {
        assert!(tx.arrival >= sigma);
        assert!(tx.arrival < tau);
    }
}

#[test]
fn mm1_long_run_statistics_converge_to_their_parameters() {
    let pool = StreamPool::new(99);
    let lambda = 0.7;
    let mu1 = 10.0;
    let mu2 = 590.0;
    let scheduler = mm1_scheduler(99, lambda, mu1, mu2);
    let config = mm1_config(1000, 0.0, 6e5, 600.0, false);
    let simulator = QueueSimulator::new(scheduler, config, pool.stream(stream_index::MM1_SIMULATOR), None);
    let output = simulator.run().unwrap();

    let mut selection_durations = Vec::new();
    for pair in output.blocks.windows(2) {
        if let Some(mining) = pair[0].mining {
            selection_durations.push(pair[1].selection - mining);
        }
    }
    let mean_selection_duration =
        selection_durations.iter().sum::<f64>() / selection_durations.len() as f64;

    let report = stats::compute_stats(&output);
    let mean_interarrival = report.mean_interarrival.expect("non-empty run has arrivals");
    let mean_service = report.mean_service.expect("non-empty run has mined blocks");

    let expected_interarrival = lambda;
    assert!(
        (mean_interarrival - expected_interarrival).abs() / expected_interarrival < 0.05,
        "mean interarrival {mean_interarrival} not within 5% of {expected_interarrival}"
    );
    assert!(
        (mean_selection_duration - mu1).abs() / mu1 < 0.10,
        "mean selection duration {mean_selection_duration} not within 10% of {mu1}"
    );
    assert!(
        (mean_service - mu2).abs() / mu2 < 0.10,
        "mean mining duration {mean_service} not within 10% of {mu2}"
    );
}
