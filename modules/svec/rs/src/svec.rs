use derive_getters::Dissolve;
use eyre::{bail, Result};

use svec_collections_rs::rle_vec::RleVec;

use crate::error::Error;
use crate::value::{NvpIdentical, Value};

/// Run storage shared by every vector: values, u64 run lengths, NVP-aware identity.
pub type Runs = RleVec<Value, u64, NvpIdentical>;

/// A canonical run-length encoded vector of `Value`s.
///
/// Immutable once built: every operation returns a new vector. `dimension` is cached and always
/// equals the sum of the run lengths, which never exceeds `u64::MAX`.
///
/// Runs are split by [`NvpIdentical`]: NaN is identical to NaN and `-0.0` to `0.0`, so
/// `[NaN, NaN, 1.0]` encodes as `{2,1}:{NaN,1}`. NVP is identical only to NVP.
#[derive(Debug, Clone, Default, PartialEq, Dissolve)]
pub struct SparseVector {
    runs: Runs,
    dimension: u64,
}

impl SparseVector {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap runs produced by one of the canonical `RleVec` producers.
    pub(crate) fn from_canonical(runs: Runs) -> Self {
        debug_assert!(runs.is_canonical());
        let dimension = runs.total_length();
        Self { runs, dimension }
    }

    /// Build from already segmented runs, e.g. the two lists of a literal.
    ///
    /// Counts must be positive, add up to at most `u64::MAX` and both lists must have the same
    /// length. With `trim` set, adjacent identical runs are merged, otherwise they are rejected.
    pub fn from_runs(counts: Vec<u64>, values: Vec<Value>, trim: bool) -> Result<Self> {
        if counts.len() != values.len() {
            bail!(Error::malformed(format!(
                "got {} run counts but {} values",
                counts.len(),
                values.len()
            )));
        }
        if let Some(ind) = counts.iter().position(|count| *count == 0) {
            bail!(Error::malformed(format!(
                "run counts must be positive, got 0 for the run #{}",
                ind + 1
            )));
        }
        if counts
            .iter()
            .try_fold(0u64, |total, count| total.checked_add(*count))
            .is_none()
        {
            bail!(Error::malformed("run counts overflow the maximal dimension"));
        }

        let mut runs = Runs::builder(NvpIdentical)
            .with_rle_values(values, counts)?
            .build();
        if !runs.is_canonical() {
            if !trim {
                bail!(Error::malformed("adjacent runs hold identical values"));
            }
            let absorbed = runs.canonicalize()?;
            log::warn!("Merged {absorbed} adjacent runs with identical values");
        }
        Ok(Self::from_canonical(runs))
    }

    /// Number of elements.
    pub fn dimension(&self) -> u64 {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }

    pub fn runs(&self) -> &Runs {
        &self.runs
    }

    /// Number of runs.
    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.runs.lengths().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.runs.values().copied()
    }
}

/// Operand of the engine: a vector, or a scalar broadcast to the dimension of the other operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Svec {
    Vector(SparseVector),
    Scalar(Value),
}

impl Svec {
    pub fn scalar(value: f64) -> Self {
        Svec::Scalar(Some(value))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Svec::Scalar(_))
    }

    /// Dimension of a vector, `None` for scalars.
    pub fn dimension(&self) -> Option<u64> {
        match self {
            Svec::Vector(vector) => Some(vector.dimension()),
            Svec::Scalar(_) => None,
        }
    }

    pub fn as_vector(&self) -> Result<&SparseVector> {
        match self {
            Svec::Vector(vector) => Ok(vector),
            Svec::Scalar(_) => bail!(Error::unsupported("operation requires a vector, got a scalar")),
        }
    }

    pub fn into_vector(self) -> Result<SparseVector> {
        match self {
            Svec::Vector(vector) => Ok(vector),
            Svec::Scalar(_) => bail!(Error::unsupported("operation requires a vector, got a scalar")),
        }
    }
}

impl From<SparseVector> for Svec {
    fn from(vector: SparseVector) -> Self {
        Svec::Vector(vector)
    }
}

impl From<f64> for Svec {
    fn from(value: f64) -> Self {
        Svec::scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NVP;

    fn runs_of(vector: &SparseVector) -> Vec<(u64, Value)> {
        vector.counts().zip(vector.values()).collect()
    }

    #[test]
    fn test_from_runs() -> Result<()> {
        let vector = SparseVector::from_runs(vec![1, 2, 3], vec![Some(4.0), NVP, Some(5.0)], false)?;
        assert_eq!(vector.dimension(), 6);
        assert_eq!(vector.num_runs(), 3);
        assert_eq!(
            runs_of(&vector),
            vec![(1, Some(4.0)), (2, NVP), (3, Some(5.0))]
        );
        Ok(())
    }

    #[test]
    fn test_from_runs_trim() -> Result<()> {
        let counts = vec![1, 2, 3, 1];
        let values = vec![Some(1.0), Some(1.0), NVP, NVP];

        let err = SparseVector::from_runs(counts.clone(), values.clone(), false).unwrap_err();
        assert!(matches!(Error::find(&err), Some(Error::MalformedEncoding(_))));

        let vector = SparseVector::from_runs(counts, values, true)?;
        assert_eq!(runs_of(&vector), vec![(3, Some(1.0)), (4, NVP)]);
        assert_eq!(vector.dimension(), 7);
        Ok(())
    }

    #[test]
    fn test_from_runs_rejects_malformed() {
        for (counts, values) in [
            (vec![1, 2], vec![Some(1.0)]),
            (vec![1, 0], vec![Some(1.0), Some(2.0)]),
            (vec![u64::MAX, 1], vec![Some(1.0), Some(2.0)]),
            (vec![u64::MAX, 1], vec![Some(1.0), Some(1.0)]),
        ] {
            let err = SparseVector::from_runs(counts, values, true).unwrap_err();
            assert!(matches!(Error::find(&err), Some(Error::MalformedEncoding(_))));
        }
    }

    #[test]
    fn test_svec_variants() -> Result<()> {
        let scalar = Svec::from(5.0);
        assert!(scalar.is_scalar());
        assert_eq!(scalar.dimension(), None);
        assert!(scalar.as_vector().is_err());

        let vector = Svec::from(SparseVector::from_runs(vec![3], vec![Some(7.0)], false)?);
        assert_eq!(vector.dimension(), Some(3));
        assert_eq!(vector.into_vector()?.num_runs(), 1);
        Ok(())
    }
}
