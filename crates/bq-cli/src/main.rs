//! Command-line driver: loads a parameters directory, builds the
//! requested scheduler(s), runs the simulation to completion, and prints
//! a stats report per mode.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use bq_core::params::{self, FeeSourceParams, SimulationParameters};
use bq_core::process::{Map, Ph, PhLabel};
use bq_core::rng::{stream_index, StreamPool};
use bq_core::scheduler::{MapPhScheduler, MmScheduler};
use bq_core::sim::{QueueConfig, QueueSimulator};
use bq_core::stats;

/// Discrete-event simulator for a proof-of-work blockchain modeled as a
/// single-server batch-service queue.
#[derive(Debug, Parser)]
#[command(name = "bq-sim", version, about)]
struct Args {
    /// Directory containing one CSV per parameter.
    #[arg(default_value = "parameters")]
    parameters_dir: PathBuf,

    /// Root seed for every RNG stream. Defaults to 0 when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Run the M/M/1 (Poisson arrivals, exponential service) simulation.
    #[arg(long)]
    mm1: bool,

    /// Run the MAP/PH/1 (Markovian arrivals, phase-type service) simulation.
    #[arg(long)]
    mapph1: bool,

    /// Attach sampled fees to transactions and select in fee-priority order.
    #[arg(long)]
    fees: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if !args.mm1 && !args.mapph1 {
        bail!("no simulation mode selected; pass --mm1 and/or --mapph1");
    }

    let raw = params::load_directory(&args.parameters_dir)
        .with_context(|| format!("reading {}", args.parameters_dir.display()))?;
    let parameters = SimulationParameters::from_raw(raw).context("validating parameters")?;

    let seed = args.seed.unwrap_or(0);
    let pool = StreamPool::new(seed);
    info!(seed, mm1 = args.mm1, mapph1 = args.mapph1, "starting run");

    if args.mm1 {
        run_mm1(&parameters, &pool, args.fees)?;
    }
    if args.mapph1 {
        run_mapph1(&parameters, &pool, args.fees)?;
    }

    Ok(())
}

fn fee_source(parameters: &SimulationParameters, fees: bool) -> Option<bq_core::sim::FeeSource> {
    fees.then(|| parameters.fees.clone().into_source())
}

fn queue_config(parameters: &SimulationParameters, fees: bool) -> QueueConfig {
    QueueConfig {
        b: parameters.b,
        sigma: parameters.sigma,
        tau: parameters.tau,
        upsilon: parameters.upsilon,
        fees,
    }
}

fn run_mm1(parameters: &SimulationParameters, pool: &StreamPool, fees: bool) -> Result<()> {
    let scheduler = MmScheduler::new(
        parameters.lambda,
        parameters.mu1,
        parameters.mu2,
        pool.stream(stream_index::MM_ARRIVAL),
        pool.stream(stream_index::MM_SELECTION),
        pool.stream(stream_index::MM_MINING),
    );
    let config = queue_config(parameters, fees);
    let simulator = QueueSimulator::new(
        scheduler,
        config,
        pool.stream(stream_index::MM1_SIMULATOR),
        fee_source(parameters, fees),
    );
    let output = simulator.run().context("M/M/1 simulation failed")?;
    let report = stats::compute_stats(&output);
    println!("== M/M/1 ==");
    println!("{report}");
    Ok(())
}

fn run_mapph1(parameters: &SimulationParameters, pool: &StreamPool, fees: bool) -> Result<()> {
    let map = Map::new(
        &mut pool.stream(stream_index::MAP_INIT),
        parameters.c.clone(),
        parameters.d.clone(),
        parameters.omega.clone(),
    )
    .context("building MAP")?;
    let selection = Ph::new(
        &mut pool.stream(stream_index::SELECTION_PH_INIT),
        parameters.s.clone(),
        parameters.beta.clone(),
        PhLabel::Selection,
    )
    .context("building selection PH")?;
    let mining = Ph::new(
        &mut pool.stream(stream_index::MINING_PH_INIT),
        parameters.t.clone(),
        parameters.alpha.clone(),
        PhLabel::Mining,
    )
    .context("building mining PH")?;

    let scheduler = MapPhScheduler::new(map, selection, mining, pool.stream(stream_index::MAP_PH_SCHEDULER));
    let config = queue_config(parameters, fees);
    let simulator = QueueSimulator::new(
        scheduler,
        config,
        pool.stream(stream_index::MAPPH1_SIMULATOR),
        fee_source(parameters, fees),
    );
    let output = simulator.run().context("MAP/PH/1 simulation failed")?;
    let report = stats::compute_stats(&output);
    println!("== MAP/PH/1 ==");
    println!("{report}");
    Ok(())
}
