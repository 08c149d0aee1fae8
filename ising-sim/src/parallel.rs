use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::IsingError;
use crate::spins::Observables;

/// Build the fixed-size pool one engine runs its workers on.
pub fn build_pool(n_workers: usize, label: &'static str) -> Result<ThreadPool, IsingError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .thread_name(move |i| format!("{label}-{i}"))
        .build()?;
    debug!(engine = label, n_workers, "worker pool ready");
    Ok(pool)
}

/// Run `body` once per worker as independent tasks and join them all.
///
/// Each task gets exclusive access to its own worker state and returns a
/// partial observable delta; the partials are summed only after every task has
/// finished, so the shared accumulators are never raced.
///
/// With a single worker the body runs on the calling thread (no rayon
/// overhead).
pub fn par_over_workers<W, F>(pool: &ThreadPool, workers: &mut [W], body: F) -> Observables
where
    W: Send,
    F: Fn(&mut W) -> Observables + Sync,
{
    if workers.len() == 1 {
        return body(&mut workers[0]);
    }

    let mut partials = vec![Observables::default(); workers.len()];
    let body = &body;
    pool.scope(|s| {
        for (worker, slot) in workers.iter_mut().zip(partials.iter_mut()) {
            s.spawn(move |_| *slot = body(worker));
        }
    });
    partials.into_iter().sum()
}
