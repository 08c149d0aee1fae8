use std::io::{self, Write};

use super::Statistics;

/// Equilibrium averages at one temperature.
///
/// Energy and magnetization are per spin; magnetization is the mean of |M|/N
/// since the sign of an ordered finite lattice wanders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRecord {
    pub temperature: f64,
    /// ⟨E⟩/N.
    pub energy: f64,
    /// ⟨|M|⟩/N.
    pub magnetization: f64,
    /// ⟨(E/N)²⟩.
    pub energy2: f64,
    /// ⟨(M/N)²⟩.
    pub magnetization2: f64,
    pub energy_err: f64,
    pub magnetization_err: f64,
    /// Samples that entered the averages.
    pub samples: usize,
}

impl SweepRecord {
    pub fn from_stats(temperature: f64, energy: &Statistics, magnetization: &Statistics) -> Self {
        Self {
            temperature,
            energy: energy.mean(),
            magnetization: magnetization.mean(),
            energy2: energy.second_moment(),
            magnetization2: magnetization.second_moment(),
            energy_err: energy.std_error(),
            magnetization_err: magnetization.std_error(),
            samples: energy.count,
        }
    }

    /// Specific heat per spin, `N (⟨e²⟩ − ⟨e⟩²) / T²`.
    pub fn specific_heat(&self, n_spins: usize) -> f64 {
        let var = (self.energy2 - self.energy * self.energy).max(0.0);
        n_spins as f64 * var / (self.temperature * self.temperature)
    }

    /// Susceptibility per spin, `N (⟨m²⟩ − ⟨|m|⟩²) / T`.
    pub fn susceptibility(&self, n_spins: usize) -> f64 {
        let var = (self.magnetization2 - self.magnetization * self.magnetization).max(0.0);
        n_spins as f64 * var / self.temperature
    }
}

/// Results series of one engine run, one record per temperature in sweep order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub engine: &'static str,
    pub lattice_size: usize,
    pub records: Vec<SweepRecord>,
}

impl SweepResult {
    pub fn new(engine: &'static str, lattice_size: usize) -> Self {
        Self {
            engine,
            lattice_size,
            records: Vec::new(),
        }
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.energy).collect()
    }

    pub fn magnetizations(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.magnetization).collect()
    }

    /// One `temperature energy magnetization` line per record.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        for r in &self.records {
            writeln!(w, "{:.6} {:.6} {:.6}", r.temperature, r.energy, r.magnetization)?;
        }
        w.flush()
    }
}
