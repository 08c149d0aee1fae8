use std::iter::Sum;
use std::ops::AddAssign;

use super::SpinLattice;

/// Integer observables of a configuration.
///
/// `bonds` is `Σ_<ij> s_i s_j` over the 2N forward bonds, so the energy is
/// `−J · bonds`. `magnetization` is the plain spin sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observables {
    pub bonds: i64,
    pub magnetization: i64,
}

impl Observables {
    /// Change caused by flipping a spin `s` whose neighbors sum to `h`.
    #[inline]
    pub fn flip(s: i8, h: i8) -> Self {
        let (s, h) = (s as i64, h as i64);
        Self {
            bonds: -2 * s * h,
            magnetization: -2 * s,
        }
    }

    pub fn energy(&self, coupling: f64) -> f64 {
        -coupling * self.bonds as f64
    }
}

impl AddAssign for Observables {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.bonds += rhs.bonds;
        self.magnetization += rhs.magnetization;
    }
}

impl Sum for Observables {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, x| {
            acc += x;
            acc
        })
    }
}

/// Recompute bond sum and magnetization from scratch.
///
/// Each site contributes its forward bond in both dimensions.
pub fn measure(lattice: &SpinLattice) -> Observables {
    let geometry = lattice.geometry();
    let mut bonds = 0i64;
    let mut magnetization = 0i64;

    for i in 0..geometry.n_spins {
        let si = lattice.spin(i) as i64;
        magnetization += si;
        for d in 0..2 {
            let j = geometry.neighbor(i, d, true);
            bonds += si * lattice.spin(j) as i64;
        }
    }

    Observables {
        bonds,
        magnetization,
    }
}
