pub mod domain;
pub mod metropolis;
pub mod partition;
pub mod probability;
pub mod serial;
pub mod sliding;

pub use domain::DomainDecomposition;
pub use partition::{block_width, partition, Block};
pub use probability::ProbabilityTable;
pub use serial::Serial;
pub use sliding::{create_rand_vector, translate_matrix, SlidingWindow};

use crate::spins::{Observables, SpinLattice};

/// Inner-step capability injected into the simulation state machine.
///
/// A step runs a given number of Metropolis trials against the shared lattice
/// and returns the summed change of the observables. Implementations own their
/// workers and RNGs; every parallel region they open must be joined before
/// `step` returns.
pub trait UpdateStrategy {
    /// Short label used in logs and result file names.
    fn name(&self) -> &'static str;

    /// Side L of the lattice the strategy was partitioned for.
    fn lattice_size(&self) -> usize;

    /// Row-block width A (the full side for a single block).
    fn block_width(&self) -> usize;

    /// Preferred trials per step for a lattice of `n_spins` sites.
    fn chunk_trials(&self, n_spins: usize) -> u64;

    fn step(
        &mut self,
        lattice: &mut SpinLattice,
        table: &ProbabilityTable,
        trials: u64,
    ) -> Observables;
}

/// Spread `trials` over `n` workers, the first `trials % n` taking one extra.
pub(crate) fn split_trials(trials: u64, n: usize) -> impl Iterator<Item = u64> {
    let n = n as u64;
    let base = trials / n;
    let extra = trials % n;
    (0..n).map(move |k| base + u64::from(k < extra))
}
