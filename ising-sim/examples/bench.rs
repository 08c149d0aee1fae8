use std::time::Instant;

use ising_sim::{InitialSpins, SimConfig, Simulation, UpdateStrategy};

const L: usize = 128;
const N_WORKERS: usize = 4;
const T_MIN: f64 = 1.5;
const T_MAX: f64 = 3.0;
const T_STEP: f64 = 0.5;
const SWEEPS_PER_TEMP: u64 = 200;

fn time_sweep<S: UpdateStrategy>(mut sim: Simulation<S>) -> f64 {
    println!("{}", sim.strategy().name());
    let t0 = Instant::now();
    let result = sim.run_phase_transition_sweep();
    let elapsed = t0.elapsed().as_secs_f64();
    for r in &result.records {
        println!(
            "  T={:.2}  E/N={:+.4}  |m|={:.4}",
            r.temperature, r.energy, r.magnetization
        );
    }
    elapsed
}

fn main() {
    let n_spins = (L * L) as u64;
    let config = SimConfig::new(
        1.0,
        L,
        N_WORKERS,
        T_MIN,
        T_MAX,
        T_STEP,
        SWEEPS_PER_TEMP * n_spins,
    )
    .with_initial_spins(InitialSpins::Aligned)
    .with_warmup_ratio(0.25);
    let n_temps = config.temperatures().len();

    println!(
        "Lattice: {}x{}  |  Workers: {}  |  Temps: {}  |  Sweeps/temp: {}",
        L, L, N_WORKERS, n_temps, SWEEPS_PER_TEMP
    );
    println!("{}", "-".repeat(70));

    let runs = [
        ("Serial", Simulation::serial(config.clone()).map(time_sweep)),
        (
            "Domain Decomposition",
            Simulation::domain_decomposition(config.clone()).map(time_sweep),
        ),
        (
            "Sliding Window",
            Simulation::sliding_window(config).map(time_sweep),
        ),
    ];

    println!("{}", "-".repeat(70));
    let total_sweeps = (SWEEPS_PER_TEMP as usize * n_temps) as f64;
    for (label, run) in runs {
        match run {
            Ok(elapsed) => println!(
                "{:<22} {:.3} s  |  {:.3} ms/sweep",
                label,
                elapsed,
                elapsed / total_sweeps * 1000.0
            ),
            Err(e) => println!("{label:<22} skipped: {e}"),
        }
    }
}
