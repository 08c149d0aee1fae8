//! Cross-engine checks: the parallel engines must sample the same
//! equilibrium as the serial one and keep their accumulators exact.

use ising_sim::spins::measure;
use ising_sim::{InitialSpins, SimConfig, Simulation, SweepRecord, UpdateStrategy};

fn config(side: usize, n_workers: usize, t_min: f64, t_max: f64, trials: u64) -> SimConfig {
    SimConfig::new(1.0, side, n_workers, t_min, t_max, 0.5, trials)
        .with_initial_spins(InitialSpins::Aligned)
        .with_warmup_ratio(0.25)
        .with_seed(2024)
}

fn sweep<S: UpdateStrategy>(mut sim: Simulation<S>) -> Vec<SweepRecord> {
    sim.run_phase_transition_sweep();
    assert_eq!(sim.observables(), measure(sim.lattice()));
    sim.results().records.clone()
}

/// Records carry naive standard errors that ignore autocorrelation; widen
/// them by `K_SIGMA` and keep the bound above `FLOOR`.
const K_SIGMA: f64 = 10.0;
const FLOOR: f64 = 0.04;

fn assert_agree(label: &str, value: f64, err: f64, reference: f64, reference_err: f64) {
    let tolerance = (K_SIGMA * (err + reference_err)).max(FLOOR);
    assert!(
        (value - reference).abs() < tolerance,
        "{label}: {value} vs {reference} (tolerance {tolerance})"
    );
}

fn assert_records_agree(engine: &str, r: &SweepRecord, serial: &SweepRecord) {
    assert!(r.samples > 100 && serial.samples > 100, "{r:?} {serial:?}");
    assert_agree(
        &format!("{engine} energy at T={}", r.temperature),
        r.energy,
        r.energy_err,
        serial.energy,
        serial.energy_err,
    );
    assert_agree(
        &format!("{engine} |m| at T={}", r.temperature),
        r.magnetization,
        r.magnetization_err,
        serial.magnetization,
        serial.magnetization_err,
    );
}

#[test]
fn engines_agree_below_critical_temperature() {
    let trials = 1_000_000;
    let serial = sweep(Simulation::serial(config(16, 1, 2.0, 2.0, trials)).unwrap())[0];
    assert!(serial.energy < -1.5, "{serial:?}");
    assert!(serial.magnetization > 0.8, "{serial:?}");

    let dd1 = sweep(Simulation::domain_decomposition(config(16, 1, 2.0, 2.0, trials)).unwrap())[0];
    let dd4 = sweep(Simulation::domain_decomposition(config(16, 4, 2.0, 2.0, trials)).unwrap())[0];
    let sw = sweep(Simulation::sliding_window(config(16, 2, 2.0, 2.0, trials)).unwrap())[0];
    assert_records_agree("domain P=1", &dd1, &serial);
    assert_records_agree("domain P=4", &dd4, &serial);
    assert_records_agree("sliding P=2", &sw, &serial);
}

#[test]
fn engines_agree_above_critical_temperature() {
    let trials = 1_000_000;
    let serial = sweep(Simulation::serial(config(16, 1, 3.0, 3.0, trials)).unwrap())[0];
    assert!(serial.energy > -1.2 && serial.energy < -0.5, "{serial:?}");
    assert!(serial.magnetization < 0.5, "{serial:?}");

    let dd = sweep(Simulation::domain_decomposition(config(16, 4, 3.0, 3.0, trials)).unwrap())[0];
    let sw = sweep(Simulation::sliding_window(config(16, 2, 3.0, 3.0, trials)).unwrap())[0];
    assert_records_agree("domain P=4", &dd, &serial);
    assert_records_agree("sliding P=2", &sw, &serial);
}

#[test]
fn accumulators_stay_exact_under_contention() {
    for n_workers in [1, 2, 4, 8] {
        let cfg = config(16, n_workers, 1.0, 4.0, 20_000).with_initial_spins(InitialSpins::Random);
        let mut dd = Simulation::domain_decomposition(cfg.clone()).unwrap();
        dd.run_phase_transition_sweep();
        assert_eq!(dd.observables(), measure(dd.lattice()), "dd n_workers={n_workers}");
        assert!(dd
            .lattice()
            .snapshot()
            .iter()
            .all(|&s| s == 1 || s == -1));

        // width-2 blocks are too narrow for the sliding window
        if 16 / n_workers >= 3 {
            let mut sw = Simulation::sliding_window(cfg).unwrap();
            sw.run_phase_transition_sweep();
            assert_eq!(sw.observables(), measure(sw.lattice()), "sw n_workers={n_workers}");
        }
    }
}

#[test]
fn magnetization_falls_through_the_transition() {
    let cfg = SimConfig::new(1.0, 32, 4, 1.5, 3.0, 0.5, 1_500_000)
        .with_initial_spins(InitialSpins::Aligned)
        .with_warmup_ratio(0.25)
        .with_seed(7);
    let records = sweep(Simulation::domain_decomposition(cfg).unwrap());
    assert_eq!(records.len(), 4);

    for pair in records.windows(2) {
        assert!(
            pair[0].magnetization > pair[1].magnetization,
            "{:?} -> {:?}",
            pair[0],
            pair[1]
        );
        assert!(pair[0].energy < pair[1].energy, "{:?} -> {:?}", pair[0], pair[1]);
    }
    assert!(records[0].magnetization > 0.95);
    assert!(records[3].magnetization < 0.3);
}
