use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, info};

use crate::config::{InitialSpins, SimConfig};
use crate::error::IsingError;
use crate::mcmc::{DomainDecomposition, ProbabilityTable, Serial, SlidingWindow, UpdateStrategy};
use crate::spins::{measure, Observables, SpinLattice};
use crate::statistics::{Statistics, SweepRecord, SweepResult};

/// Where the temperature sweep currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// Probability table being built for this temperature.
    SweepingTemperature(f64),
    /// Workers running steps at this temperature.
    RunningStep(f64),
    /// All steps joined; averages being formed.
    AggregatingResults(f64),
    Done,
}

/// Temperature sweep driver shared by every engine.
///
/// For each temperature from `t_min` to `t_max` it builds the Metropolis
/// table, runs `trials_per_temperature` trials through the injected
/// [`UpdateStrategy`] one chunk at a time, samples energy and magnetization at
/// every join, and appends the averages to the results series.
///
/// The lattice is never reset between temperatures, so a sweep anneals
/// upward from `t_min`. Running the sweep again continues from whatever
/// configuration the previous run left behind.
#[derive(Debug)]
pub struct Simulation<S> {
    config: SimConfig,
    lattice: SpinLattice,
    strategy: S,
    /// Incrementally maintained bond sum and magnetization.
    observables: Observables,
    phase: Phase,
    temperature: f64,
    results: SweepResult,
}

impl Simulation<Serial> {
    pub fn serial(config: SimConfig) -> Result<Self, IsingError> {
        let strategy = Serial::new(&config)?;
        Self::new(config, strategy)
    }
}

impl Simulation<DomainDecomposition> {
    pub fn domain_decomposition(config: SimConfig) -> Result<Self, IsingError> {
        let strategy = DomainDecomposition::new(&config)?;
        Self::new(config, strategy)
    }
}

impl Simulation<SlidingWindow> {
    pub fn sliding_window(config: SimConfig) -> Result<Self, IsingError> {
        let strategy = SlidingWindow::new(&config)?;
        Self::new(config, strategy)
    }
}

impl<S: UpdateStrategy> Simulation<S> {
    /// Validate `config` against itself and against `strategy`, then build
    /// the initial lattice.
    pub fn new(config: SimConfig, strategy: S) -> Result<Self, IsingError> {
        config.check()?;
        let side = config.lattice_size;
        if strategy.lattice_size() != side {
            return Err(IsingError::config(format!(
                "{} strategy was built for L={}, config has L={side}",
                strategy.name(),
                strategy.lattice_size()
            )));
        }

        let lattice = match config.initial_spins {
            InitialSpins::Random => {
                let mut rng = Xoshiro256StarStar::seed_from_u64(config.seed);
                SpinLattice::random(side, &mut rng)
            }
            InitialSpins::Aligned => SpinLattice::aligned(side),
        };
        let observables = measure(&lattice);
        let results = SweepResult::new(strategy.name(), side);

        Ok(Self {
            temperature: config.t_min,
            config,
            lattice,
            strategy,
            observables,
            phase: Phase::Idle,
            results,
        })
    }

    pub fn run_phase_transition_sweep(&mut self) -> &SweepResult {
        self.run_phase_transition_sweep_with(|_| {})
    }

    /// Run the full sweep, calling `on_temperature` after each temperature's
    /// record is formed (useful for progress bars).
    pub fn run_phase_transition_sweep_with(
        &mut self,
        mut on_temperature: impl FnMut(&SweepRecord),
    ) -> &SweepResult {
        self.results.records.clear();

        for temperature in self.config.temperatures() {
            self.transition(Phase::SweepingTemperature(temperature));
            self.temperature = temperature;
            let table = ProbabilityTable::new(self.config.coupling, temperature);

            let record = self.simulate_temperature(&table);
            on_temperature(&record);
            self.results.records.push(record);
        }

        self.transition(Phase::Done);
        &self.results
    }

    fn simulate_temperature(&mut self, table: &ProbabilityTable) -> SweepRecord {
        let temperature = table.temperature;
        let n_spins = self.lattice.n_spins();
        let inv_n = 1.0 / n_spins as f64;

        let total = self.config.trials_per_temperature;
        let chunk = self.strategy.chunk_trials(n_spins).max(1);
        let n_chunks = total.div_ceil(chunk);
        let warmup_chunks = (n_chunks as f64 * self.config.warmup_ratio) as u64;

        let mut energy = Statistics::default();
        let mut magnetization = Statistics::default();

        self.transition(Phase::RunningStep(temperature));
        let mut remaining = total;
        for chunk_id in 0..n_chunks {
            let trials = remaining.min(chunk);
            let delta = self.strategy.step(&mut self.lattice, table, trials);
            self.observables += delta;
            remaining -= trials;

            if chunk_id >= warmup_chunks {
                energy.update(self.observables.energy(self.config.coupling) * inv_n);
                magnetization.update(self.observables.magnetization.abs() as f64 * inv_n);
            }
        }

        self.transition(Phase::AggregatingResults(temperature));
        let record = SweepRecord::from_stats(temperature, &energy, &magnetization);
        info!(
            engine = self.strategy.name(),
            temperature,
            energy = record.energy,
            magnetization = record.magnetization,
            samples = record.samples,
            "temperature complete"
        );
        record
    }

    fn transition(&mut self, next: Phase) {
        debug!(engine = self.strategy.name(), from = ?self.phase, to = ?next, "phase");
        self.phase = next;
    }

    /// Serialize the results series, one `temperature energy magnetization`
    /// line per temperature.
    pub fn write_results(&self, w: impl Write) -> io::Result<()> {
        self.results.write_to(w)
    }

    /// Write the results series to `path`, replacing any existing file.
    pub fn store_results_to_file(&self, path: impl AsRef<Path>) -> Result<(), IsingError> {
        let file = File::create(path.as_ref())?;
        self.write_results(BufWriter::new(file))?;
        Ok(())
    }

    /// Row-block width A of the injected strategy.
    pub fn block_width(&self) -> usize {
        self.strategy.block_width()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Temperature of the current (or last) sweep stage; `t_min` before any run.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Total energy −J·Σ s_i s_j, maintained incrementally.
    pub fn energy(&self) -> f64 {
        self.observables.energy(self.config.coupling)
    }

    /// Total magnetization Σ s_i, maintained incrementally.
    pub fn magnetization(&self) -> i64 {
        self.observables.magnetization
    }

    pub fn observables(&self) -> Observables {
        self.observables
    }

    pub fn lattice(&self) -> &SpinLattice {
        &self.lattice
    }

    pub fn results(&self) -> &SweepResult {
        &self.results
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
