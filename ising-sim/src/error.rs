//! Error types for the Ising engines.

use thiserror::Error;

/// Errors surfaced by engine construction and result storage.
///
/// The Monte Carlo hot path itself is infallible; everything here is detected
/// either before the first trial runs or while writing finished results.
#[derive(Debug, Error)]
pub enum IsingError {
    /// A constructor parameter failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The worker count does not split the lattice rows evenly.
    #[error("{n_workers} workers cannot evenly partition a lattice of {lattice_size} rows")]
    Partition {
        lattice_size: usize,
        n_workers: usize,
    },

    /// Sliding-window blocks need at least one row that is neither first nor last.
    #[error("block width {block_width} leaves no interior rows for the sliding window (need >= 3)")]
    WindowTooNarrow { block_width: usize },

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Writing results or reports failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IsingError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
