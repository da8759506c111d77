use eyre::Result;

use super::{Accumulator, Sum};
use crate::svec::SparseVector;
use crate::value::is_nonzero;

/// Per-position number of vectors holding a value that is neither NVP nor zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountNonzero {
    counts: Sum,
}

impl Accumulator for CountNonzero {
    fn start() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, vector: &SparseVector) -> Result<()> {
        self.counts.accumulate(&vector.indicator()?)
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        self.counts.merge(other.counts)
    }

    fn finish(self) -> Result<Option<SparseVector>> {
        self.counts.finish()
    }
}

impl SparseVector {
    /// 1.0 where the element is neither NVP nor zero, 0.0 elsewhere.
    pub(crate) fn indicator(&self) -> Result<SparseVector> {
        let runs = self
            .runs()
            .map(|value| Some(if is_nonzero(value) { 1.0 } else { 0.0 }))?;
        Ok(SparseVector::from_canonical(runs))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::vectors;
    use super::*;

    #[test]
    fn test_indicator() -> Result<()> {
        for (literal, expected) in [
            ("{1,2,1}:{0,1,5}", "{1,3}:{0,1}"),
            ("{2,1,1}:{NVP,0,-3}", "{3,1}:{0,1}"),
            ("{4}:{0}", "{4}:{0}"),
        ] {
            let vector = &vectors(&[literal])[0];
            assert_eq!(vector.indicator()?.to_string(), expected, "{literal}");
        }
        Ok(())
    }
}
