//! Concurrency-limited parallel iteration utilities.
//!
//! Wraps rayon's `par_iter` to process items in parallel while limiting
//! the number of items in flight at once (e.g. to cap how many decoded
//! image tiles are resident in memory).

use rayon::prelude::*;

/// Sums `f` over `items` in parallel with at most `max_concurrent` items in flight.
///
/// Stops at the first chunk that contains an error and returns it.
/// Items within the failing chunk may still be processed in parallel.
///
/// # Panics
///
/// Panics if `max_concurrent` is 0.
pub fn try_par_sum_limited<T, E, F>(items: &[T], max_concurrent: usize, f: F) -> Result<u64, E>
where
    T: Sync,
    E: Send,
    F: Fn(&T) -> Result<u64, E> + Sync,
{
    assert!(max_concurrent > 0, "max_concurrent must be > 0");

    let mut total = 0u64;
    for chunk in items.chunks(max_concurrent) {
        total += chunk
            .par_iter()
            .map(&f)
            .try_reduce(|| 0, |a, b| Ok(a + b))?;
    }
    Ok(total)
}
