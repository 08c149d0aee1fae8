use std::sync::atomic::{AtomicI8, Ordering};

use rand::Rng;

use crate::geometry::Lattice;

/// Spin configuration shared by all workers of one simulation run.
///
/// Each site is an `AtomicI8` holding +1 or −1. Two write paths exist:
///
/// - [`flip_exclusive`](Self::flip_exclusive) for sites no other worker can
///   observe during the current region (block interiors). It is a relaxed
///   load/store pair, which compiles to plain moves.
/// - [`flip_atomic`](Self::flip_atomic) for block-boundary sites, a
///   compare-and-swap that only succeeds if the cell still holds the value the
///   caller based its decision on.
///
/// Whole-lattice rewrites (initialization, translation) go through `&mut self`,
/// so the borrow checker guarantees no worker is mid-trial.
#[derive(Debug)]
pub struct SpinLattice {
    geometry: Lattice,
    spins: Vec<AtomicI8>,
}

impl SpinLattice {
    /// Build from explicit ±1 values in row-major order.
    pub fn from_spins(side: usize, spins: &[i8]) -> Self {
        let geometry = Lattice::new(side);
        assert_eq!(spins.len(), geometry.n_spins, "expected {} spins", geometry.n_spins);
        assert!(
            spins.iter().all(|&s| s == 1 || s == -1),
            "spins must be +1 or -1"
        );
        Self {
            geometry,
            spins: spins.iter().map(|&s| AtomicI8::new(s)).collect(),
        }
    }

    /// Every spin +1.
    pub fn aligned(side: usize) -> Self {
        let geometry = Lattice::new(side);
        Self {
            geometry,
            spins: (0..geometry.n_spins).map(|_| AtomicI8::new(1)).collect(),
        }
    }

    /// Independent ±1 spins with equal probability.
    pub fn random(side: usize, rng: &mut impl Rng) -> Self {
        let geometry = Lattice::new(side);
        Self {
            geometry,
            spins: (0..geometry.n_spins)
                .map(|_| AtomicI8::new(if rng.gen::<f32>() < 0.5 { -1 } else { 1 }))
                .collect(),
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Lattice {
        &self.geometry
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.geometry.side
    }

    #[inline]
    pub fn n_spins(&self) -> usize {
        self.geometry.n_spins
    }

    #[inline]
    pub fn spin(&self, site: usize) -> i8 {
        self.spins[site].load(Ordering::Relaxed)
    }

    /// Spin at `(row, col)` with periodic wraparound.
    pub fn get(&self, row: isize, col: isize) -> i8 {
        self.spin(self.geometry.site(row, col))
    }

    /// Overwrite the spin at `(row, col)` with periodic wraparound.
    pub fn set(&mut self, row: isize, col: isize, spin: i8) {
        assert!(spin == 1 || spin == -1, "spin must be +1 or -1, got {spin}");
        let site = self.geometry.site(row, col);
        *self.spins[site].get_mut() = spin;
    }

    /// Up, down, left and right neighbor spins of `(row, col)`.
    pub fn neighbors(&self, row: isize, col: isize) -> [i8; 4] {
        self.geometry
            .neighbors(self.geometry.site(row, col))
            .map(|j| self.spin(j))
    }

    /// Sum of the four neighbor spins of `site`, in `-4..=4`.
    #[inline]
    pub fn neighbor_sum(&self, site: usize) -> i8 {
        self.geometry
            .neighbors(site)
            .iter()
            .map(|&j| self.spin(j))
            .sum()
    }

    /// Negate `site` without synchronization.
    ///
    /// Only valid when the caller is the sole reader and writer of `site` and
    /// of every cell whose neighborhood includes it for the current region.
    #[inline]
    pub fn flip_exclusive(&self, site: usize) {
        let cell = &self.spins[site];
        cell.store(-cell.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Negate `site` if it still holds `expected`. Returns whether it flipped.
    #[inline]
    pub fn flip_atomic(&self, site: usize, expected: i8) -> bool {
        self.spins[site]
            .compare_exchange(expected, -expected, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Raw cell buffer, row-major.
    pub fn as_slice(&self) -> &[AtomicI8] {
        &self.spins
    }

    /// Raw cell buffer for whole-lattice rewrites.
    pub fn as_mut_slice(&mut self) -> &mut [AtomicI8] {
        &mut self.spins
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Vec<i8> {
        self.spins.iter().map(|s| s.load(Ordering::Relaxed)).collect()
    }
}
