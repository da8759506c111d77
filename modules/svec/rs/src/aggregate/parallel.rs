use eyre::Result;
use rayon::prelude::*;

use svec_core_rs::parallelism;

use super::Accumulator;
use crate::config;
use crate::svec::SparseVector;

/// Split `vectors` into one shard per worker, accumulate shards in parallel and merge the
/// partial states.
pub fn reduce<A>(vectors: &[SparseVector], config: &config::Reduce) -> Result<Option<SparseVector>>
where
    A: Accumulator + Send,
{
    if vectors.is_empty() {
        return Ok(None);
    }

    let pool = parallelism::pool(config.threads)?;
    let shard = vectors.len().div_ceil(pool.current_num_threads());
    log::debug!(
        "Reducing {} vectors in shards of {shard} on {} threads",
        vectors.len(),
        pool.current_num_threads()
    );

    let accumulator = pool.install(|| {
        vectors
            .par_chunks(shard)
            .map(|chunk| -> Result<A> {
                let mut accumulator = A::start();
                for vector in chunk {
                    accumulator.accumulate(vector)?;
                }
                Ok(accumulator)
            })
            .try_reduce(A::start, |mut left, right| {
                left.merge(right)?;
                Ok(left)
            })
    })?;
    accumulator.finish()
}
