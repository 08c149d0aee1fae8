use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::ThreadPool;
use tracing::debug;

use super::metropolis::exclusive_trial;
use super::partition::{partition, Block};
use super::{split_trials, ProbabilityTable, UpdateStrategy};
use crate::config::SimConfig;
use crate::error::IsingError;
use crate::parallel::{build_pool, par_over_workers};
use crate::spins::{Observables, SpinLattice};

/// Fill `out` with `count` sites drawn uniformly from the interior rows of
/// `block` (never its first or last row).
///
/// `block` must have at least one interior row.
pub fn create_rand_vector(
    block: &Block,
    count: usize,
    rng: &mut impl Rng,
    out: &mut Vec<usize>,
) {
    let interior = block.interior_rows();
    assert!(interior > 0, "block {} has no interior rows", block.index);
    out.clear();
    out.extend((0..count).map(|_| {
        let row = block.first_row + 1 + rng.gen_range(0..interior);
        let col = rng.gen_range(0..block.side);
        row * block.side + col
    }));
}

/// Cyclically shift a row-major `side × side` buffer down by `rows` rows.
///
/// Row `r` moves to row `(r + rows) % side`. Applying it `side / rows` times
/// (when `rows` divides `side`) is the identity.
pub fn translate_matrix<T>(cells: &mut [T], side: usize, rows: usize) {
    assert_eq!(cells.len(), side * side, "buffer is not {side}x{side}");
    cells.rotate_right((rows % side) * side);
}

#[derive(Debug)]
struct Worker {
    block: Block,
    rng: Xoshiro256StarStar,
    /// Sites for the current epoch, rebuilt every epoch.
    candidates: Vec<usize>,
    quota: u64,
}

/// Sliding-window engine.
///
/// Rows are split into blocks as for domain decomposition, but workers only
/// ever pick sites strictly inside their block, so no two workers touch
/// neighboring cells and no synchronization is needed inside an epoch. After
/// each epoch (`flips_per_block` trials per worker) all workers are joined and
/// the lattice is translated by one row, so the rows that were block edges
/// become interior in later epochs. `side` translations bring the lattice back
/// to its original alignment.
///
/// The shift is a single row, not a whole block width: an A-row shift maps
/// every block onto the next one, so block edge rows would stay edge rows and
/// never be sampled.
#[derive(Debug)]
pub struct SlidingWindow {
    side: usize,
    block_width: usize,
    flips_per_block: u64,
    slide_rows: usize,
    pool: ThreadPool,
    workers: Vec<Worker>,
    translations: u64,
}

impl SlidingWindow {
    pub fn new(config: &SimConfig) -> Result<Self, IsingError> {
        config.check()?;
        let n_workers = config.n_workers;
        let blocks = partition(config.lattice_size, n_workers)?;
        let block_width = blocks[0].width;
        if block_width < 3 {
            return Err(IsingError::WindowTooNarrow { block_width });
        }
        let flips_per_block = config
            .flips_per_block
            .unwrap_or((blocks[0].interior_rows() * config.lattice_size) as u64);

        let workers = blocks
            .into_iter()
            .map(|block| Worker {
                rng: Xoshiro256StarStar::seed_from_u64(
                    config.seed.wrapping_add(1 + block.index as u64),
                ),
                block,
                candidates: Vec::new(),
                quota: 0,
            })
            .collect();

        Ok(Self {
            side: config.lattice_size,
            block_width,
            flips_per_block,
            slide_rows: 1,
            pool: build_pool(n_workers, "sliding")?,
            workers,
            translations: 0,
        })
    }

    /// NumFlipPerBlock: trials per worker between two translations.
    pub fn flips_per_block(&self) -> u64 {
        self.flips_per_block
    }

    /// Translations needed to restore the original row alignment.
    pub fn num_slides(&self) -> usize {
        self.side / self.slide_rows
    }

    /// Rows the lattice is currently shifted by relative to its initial layout.
    pub fn row_offset(&self) -> usize {
        ((self.translations % self.num_slides() as u64) as usize) * self.slide_rows
    }

    pub fn translations(&self) -> u64 {
        self.translations
    }

    fn trials_per_epoch(&self) -> u64 {
        self.flips_per_block.saturating_mul(self.workers.len() as u64)
    }

    fn epoch(&mut self, lattice: &mut SpinLattice, table: &ProbabilityTable, trials: u64) -> Observables {
        let n_workers = self.workers.len();
        for (worker, quota) in self.workers.iter_mut().zip(split_trials(trials, n_workers)) {
            worker.quota = quota;
        }

        let delta = {
            let lattice: &SpinLattice = lattice;
            par_over_workers(&self.pool, &mut self.workers, |w| {
                create_rand_vector(&w.block, w.quota as usize, &mut w.rng, &mut w.candidates);
                let mut delta = Observables::default();
                for &site in &w.candidates {
                    if let Some(d) = exclusive_trial(lattice, table, site, &mut w.rng) {
                        delta += d;
                    }
                }
                delta
            })
        };

        // every worker has joined; the lattice is exclusively ours again
        translate_matrix(lattice.as_mut_slice(), self.side, self.slide_rows);
        self.translations += 1;
        delta
    }
}

impl UpdateStrategy for SlidingWindow {
    fn name(&self) -> &'static str {
        "sliding_window"
    }

    fn lattice_size(&self) -> usize {
        self.side
    }

    fn block_width(&self) -> usize {
        self.block_width
    }

    fn chunk_trials(&self, _n_spins: usize) -> u64 {
        self.trials_per_epoch()
    }

    fn step(
        &mut self,
        lattice: &mut SpinLattice,
        table: &ProbabilityTable,
        trials: u64,
    ) -> Observables {
        let per_epoch = self.trials_per_epoch();
        let mut remaining = trials;
        let mut delta = Observables::default();
        while remaining > 0 {
            let n = remaining.min(per_epoch);
            delta += self.epoch(lattice, table, n);
            remaining -= n;
        }
        debug!(translations = self.translations, "sliding window step done");
        delta
    }
}
