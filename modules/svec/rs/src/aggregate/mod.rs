//! Per-position statistics over many vectors of the same dimension.
//!
//! Accumulators fold vectors one by one and can be merged, so a stream can be split into shards
//! and reduced in any order (see `parallel::reduce`). `sum_all`/`count_nonzero_all` instead sweep
//! all inputs at once. An empty input yields `None`.

use eyre::{bail, Result};

use svec_collections_rs::rle_vec::{self, MergeFn};

use crate::error::Error;
use crate::svec::SparseVector;
use crate::value::{is_nonzero, NvpIdentical, Value};

pub use count_nonzero::CountNonzero;
pub use mean::Mean;
pub use sum::Sum;

mod count_nonzero;
mod mean;
pub mod parallel;
mod sum;

pub trait Accumulator: Sized {
    /// Empty state, no vectors seen yet.
    fn start() -> Self;

    fn accumulate(&mut self, vector: &SparseVector) -> Result<()>;

    /// Absorb the partial state of another shard.
    fn merge(&mut self, other: Self) -> Result<()>;

    fn finish(self) -> Result<Option<SparseVector>>;
}

/// Drive an accumulator over a stream of vectors.
pub fn accumulate<'a, A: Accumulator>(
    vectors: impl IntoIterator<Item = &'a SparseVector>,
) -> Result<Option<SparseVector>> {
    let mut accumulator = A::start();
    for vector in vectors {
        accumulator.accumulate(vector)?;
    }
    accumulator.finish()
}

pub fn sum<'a>(vectors: impl IntoIterator<Item = &'a SparseVector>) -> Result<Option<SparseVector>> {
    accumulate::<Sum>(vectors)
}

pub fn count_nonzero<'a>(
    vectors: impl IntoIterator<Item = &'a SparseVector>,
) -> Result<Option<SparseVector>> {
    accumulate::<CountNonzero>(vectors)
}

pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a SparseVector>) -> Result<Option<SparseVector>> {
    accumulate::<Mean>(vectors)
}

/// Elementwise sum in a single sweep over all inputs.
pub fn sum_all(vectors: &[SparseVector]) -> Result<Option<SparseVector>> {
    sweep(vectors, |values| {
        values
            .iter()
            .try_fold(0.0, |total, value| Some(total + (**value)?))
    })
}

/// Per-position number of inputs holding neither NVP nor zero, in a single sweep.
pub fn count_nonzero_all(vectors: &[SparseVector]) -> Result<Option<SparseVector>> {
    sweep(vectors, |values| {
        Some(values.iter().filter(|value| is_nonzero(value)).count() as f64)
    })
}

fn sweep(
    vectors: &[SparseVector],
    f: impl FnMut(&[&Value]) -> Value,
) -> Result<Option<SparseVector>> {
    let Some(first) = vectors.first() else {
        return Ok(None);
    };
    if let Some(other) = vectors.iter().find(|x| x.dimension() != first.dimension()) {
        bail!(Error::DimensionMismatch {
            left: first.dimension(),
            right: other.dimension()
        });
    }

    let runs = rle_vec::merge(vectors.iter().map(SparseVector::runs))
        .with_merge(MergeFn::new(f))
        .with_identical(NvpIdentical)
        .run()?;
    Ok(Some(SparseVector::from_canonical(runs)))
}
