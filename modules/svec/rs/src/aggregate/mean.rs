use eyre::Result;

use super::{Accumulator, Sum};
use crate::ops::Operator;
use crate::svec::SparseVector;

/// Elementwise average of all accumulated vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mean {
    sum: Sum,
    seen: u64,
}

impl Accumulator for Mean {
    fn start() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, vector: &SparseVector) -> Result<()> {
        self.sum.accumulate(vector)?;
        self.seen += 1;
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        self.sum.merge(other.sum)?;
        self.seen += other.seen;
        Ok(())
    }

    fn finish(self) -> Result<Option<SparseVector>> {
        let seen = self.seen as f64;
        self.sum
            .finish()?
            .map(|total| total.combine_scalar(Some(seen), Operator::Div))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::vectors;
    use super::*;

    #[test]
    fn test_mean() -> Result<()> {
        let inputs = vectors(&["{2,2}:{1,3}", "{4}:{3}", "{1,3}:{NVP,0}"]);

        let mut mean = Mean::start();
        mean.accumulate(&inputs[0])?;
        mean.accumulate(&inputs[1])?;
        assert_eq!(
            mean.clone().finish()?.map(|x| x.to_string()),
            Some("{2,2}:{2,3}".to_string())
        );

        let mut shard = Mean::start();
        shard.accumulate(&inputs[2])?;
        mean.merge(shard)?;
        assert_eq!(
            mean.finish()?.map(|x| x.to_string()),
            Some("{1,1,2}:{NVP,1.3333333333333333,2}".to_string())
        );
        Ok(())
    }
}
