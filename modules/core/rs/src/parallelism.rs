use std::thread::available_parallelism;

use eyre::{Result, WrapErr};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Map a requested thread count onto [1, max].
/// Positive values are capped by `max`, zero means a single thread, and negative values count
/// back from `max` (-1 = all threads, -2 = all but one, ...).
fn normalize(requested: isize, max: usize) -> usize {
    let max = max.max(1);
    if requested > 0 {
        (requested as usize).min(max)
    } else if requested == 0 {
        1
    } else {
        let spare = requested.unsigned_abs() - 1;
        max.saturating_sub(spare).max(1)
    }
}

pub fn available(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get();
    Ok(normalize(requested, max))
}

/// Build a rayon pool sized by `available`.
pub fn pool(requested: isize) -> Result<ThreadPool> {
    let threads = available(requested)?;
    log::debug!("Building a thread pool with {threads} threads (requested {requested})");

    ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .wrap_err("Failed to build a rayon thread pool")
}
