//! Order-preserving parallel map over a worker pool
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Build a worker pool with `n_threads` workers, or one per logical CPU when
/// `None`.
pub fn build_pool(
    n_threads: Option<usize>,
) -> Result<ThreadPool, ThreadPoolBuildError> {
    let builder = ThreadPoolBuilder::new()
        .thread_name(|ix| format!("mtgp-worker-{}", ix));
    match n_threads {
        Some(n) => builder.num_threads(n).build(),
        None => builder.build(),
    }
}

/// Apply `f` to every item on `pool` and gather the outputs in input order.
///
/// Returns only after every item has been processed. The first error
/// encountered stops the remaining work and is returned instead; there are
/// no partial results.
///
/// # Example
///
/// ```
/// use mtgp::misc::{build_pool, try_par_map};
///
/// let pool = build_pool(Some(2)).unwrap();
/// let xs: Vec<u32> = (0..100).collect();
/// let squares = try_par_map(&pool, &xs, |x| Ok::<u32, ()>(x * x)).unwrap();
/// assert_eq!(squares[9], 81);
/// ```
pub fn try_par_map<T, U, E, F>(
    pool: &ThreadPool,
    items: &[T],
    f: F,
) -> Result<Vec<U>, E>
where
    T: Sync,
    U: Send,
    E: Send,
    F: Fn(&T) -> Result<U, E> + Sync + Send,
{
    pool.install(|| items.par_iter().map(&f).collect())
}
