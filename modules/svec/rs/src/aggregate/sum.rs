use eyre::Result;

use super::Accumulator;
use crate::svec::SparseVector;

/// Elementwise sum. NVP at a position makes the whole position NVP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sum {
    total: Option<SparseVector>,
}

impl Accumulator for Sum {
    fn start() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, vector: &SparseVector) -> Result<()> {
        let total = match &self.total {
            None => vector.clone(),
            Some(total) => (total + vector)?,
        };
        self.total = Some(total);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        match other.total {
            None => Ok(()),
            Some(total) => self.accumulate(&total),
        }
    }

    fn finish(self) -> Result<Option<SparseVector>> {
        Ok(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::vectors;
    use super::*;

    #[test]
    fn test_merge_shards() -> Result<()> {
        let inputs = vectors(&["{2,2}:{1,2}", "{4}:{3}", "{1,3}:{0,5}"]);

        let mut left = Sum::start();
        left.accumulate(&inputs[0])?;
        let mut right = Sum::start();
        right.accumulate(&inputs[1])?;
        right.accumulate(&inputs[2])?;

        left.merge(right)?;
        left.merge(Sum::start())?;
        assert_eq!(left.finish()?.map(|x| x.to_string()), Some("{1,1,2}:{4,9,10}".to_string()));
        Ok(())
    }

    #[test]
    fn test_failed_accumulate_keeps_state() -> Result<()> {
        let inputs = vectors(&["{2}:{1}", "{3}:{1}"]);
        let mut sum = Sum::start();
        sum.accumulate(&inputs[0])?;
        assert!(sum.accumulate(&inputs[1]).is_err());
        assert_eq!(sum.finish()?, Some(inputs[0].clone()));
        Ok(())
    }
}
