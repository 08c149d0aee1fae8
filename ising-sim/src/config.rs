use validator::{Validate, ValidationError};

use crate::error::IsingError;
use crate::mcmc::partition;

/// Upper bound on the temperatures one sweep may visit.
pub const MAX_TEMPERATURES: usize = 1_000_000;

/// How the lattice is filled before the first temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSpins {
    /// Independent ±1 with equal probability.
    Random,
    /// Every spin +1.
    Aligned,
}

impl TryFrom<&str> for InitialSpins {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "random" | "hot" => Ok(Self::Random),
            "aligned" | "cold" => Ok(Self::Aligned),
            _ => Err(format!(
                "unknown initial_spins '{s}', expected 'random' or 'aligned'"
            )),
        }
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.lattice_size < 2 {
        return Err(ValidationError::new("lattice_size must be >= 2"));
    }
    if cfg.n_workers < 1 {
        return Err(ValidationError::new("n_workers must be >= 1"));
    }
    if !(cfg.t_step > 0.0) {
        return Err(ValidationError::new("t_step must be > 0"));
    }
    if !(cfg.t_min > 0.0) {
        return Err(ValidationError::new("t_min must be > 0"));
    }
    if !(cfg.t_min <= cfg.t_max) {
        return Err(ValidationError::new("t_min must be <= t_max"));
    }
    if cfg.n_temperatures().is_none() {
        return Err(ValidationError::new(
            "temperature grid must be finite and hold at most MAX_TEMPERATURES points",
        ));
    }
    if !cfg.coupling.is_finite() {
        return Err(ValidationError::new("coupling must be finite"));
    }
    if cfg.trials_per_temperature < 1 {
        return Err(ValidationError::new("trials_per_temperature must be >= 1"));
    }
    if !(0.0..1.0).contains(&cfg.warmup_ratio) {
        return Err(ValidationError::new("warmup_ratio must be in [0, 1)"));
    }
    if cfg.flips_per_block == Some(0) {
        return Err(ValidationError::new("flips_per_block must be >= 1"));
    }
    Ok(())
}

/// Parameters shared by every engine.
///
/// The first seven fields form the constructor contract; the rest are tuning
/// knobs with defaults set by [`SimConfig::new`].
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    /// Coupling strength J (ferromagnetic when positive).
    pub coupling: f64,
    /// Side L of the square lattice.
    pub lattice_size: usize,
    /// Number of concurrent workers (and row blocks).
    pub n_workers: usize,
    pub t_min: f64,
    pub t_max: f64,
    pub t_step: f64,
    /// Metropolis trials run at each temperature.
    pub trials_per_temperature: u64,
    /// Base seed; the lattice and every worker derive their own stream from it.
    pub seed: u64,
    /// Fraction of each temperature's samples discarded before averaging.
    pub warmup_ratio: f64,
    pub initial_spins: InitialSpins,
    /// Sliding-window trials per worker between two translations.
    /// `None` means one pass over the block interior.
    pub flips_per_block: Option<u64>,
}

impl SimConfig {
    pub fn new(
        coupling: f64,
        lattice_size: usize,
        n_workers: usize,
        t_min: f64,
        t_max: f64,
        t_step: f64,
        trials_per_temperature: u64,
    ) -> Self {
        Self {
            coupling,
            lattice_size,
            n_workers,
            t_min,
            t_max,
            t_step,
            trials_per_temperature,
            seed: 42,
            warmup_ratio: 0.0,
            initial_spins: InitialSpins::Random,
            flips_per_block: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_warmup_ratio(mut self, warmup_ratio: f64) -> Self {
        self.warmup_ratio = warmup_ratio;
        self
    }

    pub fn with_initial_spins(mut self, initial_spins: InitialSpins) -> Self {
        self.initial_spins = initial_spins;
        self
    }

    pub fn with_flips_per_block(mut self, flips_per_block: u64) -> Self {
        self.flips_per_block = Some(flips_per_block);
        self
    }

    /// Validate every parameter, including the row partition.
    ///
    /// Called by every engine constructor before any simulation work.
    pub fn check(&self) -> Result<(), IsingError> {
        self.validate().map_err(|e| IsingError::config(format!("{e}")))?;
        partition::block_width(self.lattice_size, self.n_workers)?;
        Ok(())
    }

    /// Width A of each worker's row block.
    pub fn block_width(&self) -> Result<usize, IsingError> {
        partition::block_width(self.lattice_size, self.n_workers)
    }

    pub fn n_spins(&self) -> usize {
        self.lattice_size * self.lattice_size
    }

    /// Number of grid points from `t_min` to `t_max`, or `None` when the grid
    /// would be unbounded or exceed [`MAX_TEMPERATURES`].
    pub fn n_temperatures(&self) -> Option<usize> {
        let span = (self.t_max - self.t_min) / self.t_step;
        if !span.is_finite() || span < 0.0 {
            return None;
        }
        let steps = (span + 1e-9).floor();
        if steps >= MAX_TEMPERATURES as f64 {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    /// Temperatures visited by a sweep, in order.
    ///
    /// Generated by index so float accumulation never drops `t_max`. Empty
    /// for a grid that [`check`](Self::check) rejects.
    pub fn temperatures(&self) -> Vec<f64> {
        let n_temps = self.n_temperatures().unwrap_or(0);
        (0..n_temps)
            .map(|i| self.t_min + i as f64 * self.t_step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimConfig {
        SimConfig::new(1.0, 16, 4, 0.1, 2.6, 0.3, 1000)
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base().check().is_ok());
        assert_eq!(base().block_width().unwrap(), 4);
    }

    #[test]
    fn test_temperatures_include_t_max() {
        let temps = base().temperatures();
        assert_eq!(temps.len(), 9);
        assert!((temps[0] - 0.1).abs() < 1e-12);
        assert!((temps[8] - 2.5).abs() < 1e-9);

        let cfg = SimConfig::new(1.0, 16, 4, 1.5, 3.0, 0.5, 10);
        assert_eq!(cfg.temperatures().len(), 4);

        let single = SimConfig::new(1.0, 16, 4, 2.0, 2.0, 0.1, 10);
        assert_eq!(single.temperatures(), vec![2.0]);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let cases = [
            SimConfig { lattice_size: 0, ..base() },
            SimConfig { lattice_size: 1, n_workers: 1, ..base() },
            SimConfig { n_workers: 0, ..base() },
            SimConfig { t_step: 0.0, ..base() },
            SimConfig { t_step: f64::NAN, ..base() },
            SimConfig { t_min: 3.0, ..base() },
            SimConfig { t_min: 0.0, ..base() },
            SimConfig { trials_per_temperature: 0, ..base() },
            base().with_warmup_ratio(1.0),
            base().with_flips_per_block(0),
            SimConfig { t_min: 1.0, t_max: 2.0, t_step: 1e-320, ..base() },
            SimConfig { t_max: f64::INFINITY, ..base() },
            SimConfig { t_min: 1.0, t_max: 1e9, t_step: 1e-3, ..base() },
        ];
        for cfg in cases {
            assert!(
                matches!(cfg.check(), Err(IsingError::Config(_))),
                "accepted {cfg:?}"
            );
        }
    }

    #[test]
    fn test_temperature_grid_bounds() {
        assert_eq!(base().n_temperatures(), Some(9));
        let wide = SimConfig { t_min: 1.0, t_max: 1e9, t_step: 1e-3, ..base() };
        assert_eq!(wide.n_temperatures(), None);
        assert!(wide.temperatures().is_empty());

        let tiny_step = SimConfig { t_min: 1.0, t_max: 2.0, t_step: 1e-320, ..base() };
        assert_eq!(tiny_step.n_temperatures(), None);

        let largest = SimConfig {
            t_min: 1.0,
            t_max: 1.0 + (MAX_TEMPERATURES - 1) as f64,
            t_step: 1.0,
            ..base()
        };
        assert_eq!(largest.n_temperatures(), Some(MAX_TEMPERATURES));
        assert!(largest.check().is_ok());
    }

    #[test]
    fn test_uneven_partition_is_distinct_error() {
        let cfg = SimConfig { n_workers: 3, ..base() };
        assert!(matches!(
            cfg.check(),
            Err(IsingError::Partition {
                lattice_size: 16,
                n_workers: 3
            })
        ));
    }

    #[test]
    fn test_initial_spins_parse() {
        assert_eq!(InitialSpins::try_from("random"), Ok(InitialSpins::Random));
        assert_eq!(InitialSpins::try_from("cold"), Ok(InitialSpins::Aligned));
        assert!(InitialSpins::try_from("warm").is_err());
    }
}
