use rand::Rng;

use super::ProbabilityTable;
use crate::spins::{Observables, SpinLattice};

/// Metropolis trial on a site whose whole neighborhood belongs to the caller.
///
/// Returns the observable change if the flip was accepted.
#[inline]
pub fn exclusive_trial(
    lattice: &SpinLattice,
    table: &ProbabilityTable,
    site: usize,
    rng: &mut impl Rng,
) -> Option<Observables> {
    let s = lattice.spin(site);
    let h = lattice.neighbor_sum(site);
    if table.accept(s * h, rng) {
        lattice.flip_exclusive(site);
        Some(Observables::flip(s, h))
    } else {
        None
    }
}

/// Metropolis trial on a site that another worker may read concurrently.
///
/// The caller must hold whatever lock serializes writers of the neighborhood;
/// the cell itself is written by compare-and-swap against the spin the
/// decision was based on.
#[inline]
pub fn atomic_trial(
    lattice: &SpinLattice,
    table: &ProbabilityTable,
    site: usize,
    rng: &mut impl Rng,
) -> Option<Observables> {
    let s = lattice.spin(site);
    let h = lattice.neighbor_sum(site);
    if table.accept(s * h, rng) && lattice.flip_atomic(site, s) {
        Some(Observables::flip(s, h))
    } else {
        None
    }
}
