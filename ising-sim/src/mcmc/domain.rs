use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::ThreadPool;

use super::metropolis::{atomic_trial, exclusive_trial};
use super::partition::{partition, Block};
use super::{split_trials, ProbabilityTable, UpdateStrategy};
use crate::config::SimConfig;
use crate::error::IsingError;
use crate::parallel::{build_pool, par_over_workers};
use crate::spins::{Observables, SpinLattice};

/// Private state of one domain-decomposition worker.
///
/// Created once with the engine and moved into its task on every step; never
/// shared between workers.
#[derive(Debug)]
struct Worker {
    block: Block,
    rng: Xoshiro256StarStar,
    /// Trials to run in the current step.
    quota: u64,
    /// Seam with the previous block (above `block.first_row`).
    prev_seam: usize,
    /// Seam with the next block (below `block.last_row()`).
    next_seam: usize,
    boundary_trials: u64,
}

/// Domain-decomposition engine.
///
/// Rows are split into `n_workers` contiguous blocks, one per worker. Trials on
/// interior rows touch only the worker's own cells and run unsynchronized.
/// Trials on a block's first or last row read the neighboring block's edge row,
/// so they take the seam lock shared with that block and write the cell by
/// compare-and-swap. Seam `k` sits between block `k`'s last row and block
/// `k + 1`'s first row (wrapping); a width-1 block needs both of its seams,
/// which are always taken in ascending order.
#[derive(Debug)]
pub struct DomainDecomposition {
    side: usize,
    block_width: usize,
    pool: ThreadPool,
    workers: Vec<Worker>,
    /// Empty with a single worker: nothing borders another block.
    seams: Vec<Mutex<()>>,
}

impl DomainDecomposition {
    pub fn new(config: &SimConfig) -> Result<Self, IsingError> {
        config.check()?;
        let n_workers = config.n_workers;
        let blocks = partition(config.lattice_size, n_workers)?;
        let block_width = blocks[0].width;

        let workers = blocks
            .into_iter()
            .map(|block| {
                let k = block.index;
                Worker {
                    block,
                    rng: Xoshiro256StarStar::seed_from_u64(
                        config.seed.wrapping_add(1 + k as u64),
                    ),
                    quota: 0,
                    prev_seam: (k + n_workers - 1) % n_workers,
                    next_seam: k,
                    boundary_trials: 0,
                }
            })
            .collect();

        let seams = if n_workers > 1 {
            (0..n_workers).map(|_| Mutex::new(())).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            side: config.lattice_size,
            block_width,
            pool: build_pool(n_workers, "domain")?,
            workers,
            seams,
        })
    }

    pub fn n_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.workers.iter().map(|w| &w.block)
    }

    /// Trials that went through the boundary path since construction.
    pub fn boundary_trials(&self) -> u64 {
        self.workers.iter().map(|w| w.boundary_trials).sum()
    }
}

fn hold(seam: &Mutex<()>) -> MutexGuard<'_, ()> {
    seam.lock().unwrap_or_else(PoisonError::into_inner)
}

fn boundary_trial(
    lattice: &SpinLattice,
    table: &ProbabilityTable,
    seams: &[Mutex<()>],
    worker: &mut Worker,
    site: usize,
    row: usize,
) -> Option<Observables> {
    let prev = (row == worker.block.first_row).then_some(worker.prev_seam);
    let next = (row == worker.block.last_row()).then_some(worker.next_seam);
    let (lo, hi) = match (prev, next) {
        (Some(a), Some(b)) => (a.min(b), Some(a.max(b))),
        (Some(a), None) | (None, Some(a)) => (a, None),
        (None, None) => unreachable!("row {row} is not a boundary row"),
    };

    let _lo = hold(&seams[lo]);
    let _hi = hi.map(|i| hold(&seams[i]));
    worker.boundary_trials += 1;
    atomic_trial(lattice, table, site, &mut worker.rng)
}

fn run_block(
    lattice: &SpinLattice,
    table: &ProbabilityTable,
    seams: &[Mutex<()>],
    worker: &mut Worker,
) -> Observables {
    let side = worker.block.side;
    let start = worker.block.start_site();
    let n_sites = worker.block.n_sites();
    let mut delta = Observables::default();

    for _ in 0..worker.quota {
        let site = start + worker.rng.gen_range(0..n_sites);
        let row = site / side;
        let accepted = if seams.is_empty() || !worker.block.is_boundary_row(row) {
            exclusive_trial(lattice, table, site, &mut worker.rng)
        } else {
            boundary_trial(lattice, table, seams, worker, site, row)
        };
        if let Some(d) = accepted {
            delta += d;
        }
    }
    delta
}

impl UpdateStrategy for DomainDecomposition {
    fn name(&self) -> &'static str {
        "domain_decomposition"
    }

    fn lattice_size(&self) -> usize {
        self.side
    }

    fn block_width(&self) -> usize {
        self.block_width
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
        let n_workers = self.workers.len();
        for (worker, quota) in self.workers.iter_mut().zip(split_trials(trials, n_workers)) {
            worker.quota = quota;
        }

        let lattice: &SpinLattice = lattice;
        let seams = &self.seams;
        par_over_workers(&self.pool, &mut self.workers, |w| {
            run_block(lattice, table, seams, w)
        })
    }
}
