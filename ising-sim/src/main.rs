//! Ising phase-transition sweep CLI
//!
//! Runs the serial, domain-decomposition and sliding-window engines over the
//! same temperature range for a series of lattice sizes, stores each engine's
//! results and a timing report per size.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ising_sim::{InitialSpins, IsingError, SimConfig, Simulation, UpdateStrategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ising-sweep", about = "2D Ising Metropolis sweep: serial vs parallel engines")]
struct Args {
    /// Smallest lattice side; doubled until it exceeds --l-max
    #[arg(long, default_value_t = 64)]
    l_min: usize,

    #[arg(long, default_value_t = 64)]
    l_max: usize,

    /// Workers for the parallel engines
    #[arg(long, default_value_t = 4)]
    threads: usize,

    #[arg(long, default_value_t = 0.1)]
    t_min: f64,

    #[arg(long, default_value_t = 2.6)]
    t_max: f64,

    #[arg(long, default_value_t = 0.3)]
    t_step: f64,

    /// Coupling strength J
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    coupling: f64,

    /// Trials per temperature (default: ceil(L^4.4))
    #[arg(long)]
    trials: Option<u64>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of each temperature's samples discarded before averaging
    #[arg(long, default_value_t = 0.0)]
    warmup_ratio: f64,

    /// "random" or "aligned"
    #[arg(long, default_value = "random")]
    initial_spins: String,

    /// Sliding-window trials per worker between translations
    #[arg(long)]
    flips_per_block: Option<u64>,

    /// Root directory for Results/ and Performance/
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Name prefix of the performance report
    #[arg(long, default_value = "_test_1")]
    tag: String,
}

fn progress_bar(len: u64, engine: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} temps [{elapsed_precise} < {eta_precise}]",
        )
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(engine);
    pb
}

/// Sweep one engine, store its results, and return the wall time in seconds.
fn run_engine<S: UpdateStrategy>(
    mut sim: Simulation<S>,
    results_dir: &Path,
) -> Result<f64, IsingError> {
    let name = sim.strategy().name();
    let side = sim.config().lattice_size;
    let pb = progress_bar(sim.config().temperatures().len() as u64, name);

    let start = Instant::now();
    sim.run_phase_transition_sweep_with(|_| pb.inc(1));
    let elapsed = start.elapsed().as_secs_f64();
    pb.finish();

    let path = results_dir.join(format!("{name}_L_{side}.txt"));
    sim.store_results_to_file(&path)?;
    info!(
        engine = name,
        lattice_size = side,
        block_width = sim.block_width(),
        seconds = elapsed,
        "results stored to {}",
        path.display()
    );
    Ok(elapsed)
}

fn store_performance_to_file(
    timings: &[(&str, f64)],
    side: usize,
    performance_dir: &Path,
    tag: &str,
) -> Result<(), IsingError> {
    let path = performance_dir.join(format!("{tag}_L_{side}.txt"));
    let mut file = fs::File::create(&path)?;
    for (label, secs) in timings {
        writeln!(file, "{label}: {secs:.3} s")?;
    }
    info!("performance report stored to {}", path.display());
    Ok(())
}

fn main() -> Result<(), IsingError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let initial_spins =
        InitialSpins::try_from(args.initial_spins.as_str()).map_err(IsingError::Config)?;

    let results_dir = args.out_dir.join("Results");
    let performance_dir = args.out_dir.join("Performance");
    fs::create_dir_all(&results_dir)?;
    fs::create_dir_all(&performance_dir)?;

    let mut side = args.l_min;
    while side <= args.l_max {
        let trials = args
            .trials
            .unwrap_or_else(|| (side as f64).powf(4.4).ceil() as u64);
        info!(lattice_size = side, trials, workers = args.threads, "simulation start");

        let mut config = SimConfig::new(
            args.coupling,
            side,
            args.threads,
            args.t_min,
            args.t_max,
            args.t_step,
            trials,
        )
        .with_seed(args.seed)
        .with_warmup_ratio(args.warmup_ratio)
        .with_initial_spins(initial_spins);
        config.flips_per_block = args.flips_per_block;
        config.check()?;

        let timings = [
            ("Serial", run_engine(Simulation::serial(config.clone())?, &results_dir)?),
            (
                "Domain Decomposition",
                run_engine(
                    Simulation::domain_decomposition(config.clone())?,
                    &results_dir,
                )?,
            ),
            (
                "Sliding Window",
                run_engine(Simulation::sliding_window(config)?, &results_dir)?,
            ),
        ];
        store_performance_to_file(&timings, side, &performance_dir, &args.tag)?;
        side *= 2;
    }

    Ok(())
}
