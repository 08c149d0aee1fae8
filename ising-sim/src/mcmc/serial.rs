use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use super::metropolis::exclusive_trial;
use super::{ProbabilityTable, UpdateStrategy};
use crate::config::SimConfig;
use crate::error::IsingError;
use crate::spins::{Observables, SpinLattice};

/// Single-threaded reference engine.
///
/// Picks sites uniformly over the whole lattice from one RNG. The parallel
/// engines are judged against its averages.
#[derive(Debug)]
pub struct Serial {
    side: usize,
    rng: Xoshiro256StarStar,
}

impl Serial {
    pub fn new(config: &SimConfig) -> Result<Self, IsingError> {
        config.check()?;
        Ok(Self {
            side: config.lattice_size,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed.wrapping_add(1)),
        })
    }
}

impl UpdateStrategy for Serial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn lattice_size(&self) -> usize {
        self.side
    }

    fn block_width(&self) -> usize {
        self.side
    }

    fn chunk_trials(&self, n_spins: usize) -> u64 {
        n_spins as u64
    }

    fn step(
        &mut self,
        lattice: &mut SpinLattice,
        table: &ProbabilityTable,
        trials: u64,
    ) -> Observables {
        let n_spins = lattice.n_spins();
        let mut delta = Observables::default();
        for _ in 0..trials {
            let site = self.rng.gen_range(0..n_spins);
            if let Some(d) = exclusive_trial(lattice, table, site, &mut self.rng) {
                delta += d;
            }
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spins::measure;

    #[test]
    fn test_serial_step_tracks_observables() {
        let config = SimConfig::new(1.0, 8, 1, 2.0, 2.0, 0.1, 1);
        let mut serial = Serial::new(&config).unwrap();
        let mut rng = Xoshiro256StarStar::seed_from_u64(9);
        let mut lat = SpinLattice::random(8, &mut rng);
        let mut obs = measure(&lat);
        let table = ProbabilityTable::new(1.0, 2.0);

        for _ in 0..20 {
            obs += serial.step(&mut lat, &table, 64);
        }
        assert_eq!(obs, measure(&lat));
        assert_eq!(serial.block_width(), 8);
    }
}
