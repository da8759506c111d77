//! Bridge between flat arrays and `SparseVector`.

use eyre::{bail, Report, Result};

use crate::error::Error;
use crate::svec::{Runs, SparseVector, Svec};
use crate::value::{NvpIdentical, Value};

impl SparseVector {
    /// Encode a dense sequence of values. O(n) in the number of elements.
    pub fn from_values(values: &[Value]) -> Result<Self> {
        let runs = Runs::builder(NvpIdentical)
            .with_dense_values(values)?
            .build();
        Ok(Self::from_canonical(runs))
    }

    pub fn from_dense(dense: &[f64]) -> Result<Self> {
        let mut runs = Runs::builder(NvpIdentical).build();
        for value in dense {
            runs.push_run(Some(*value), 1)?;
        }
        Ok(Self::from_canonical(runs))
    }

    /// Encode a dense array with a per-element null mask (`true` = NVP).
    pub fn from_dense_with_nulls(dense: &[f64], nulls: &[bool]) -> Result<Self> {
        if dense.len() != nulls.len() {
            bail!(Error::malformed(format!(
                "got {} elements but a null mask of length {}",
                dense.len(),
                nulls.len()
            )));
        }

        let mut runs = Runs::builder(NvpIdentical).build();
        for (value, is_null) in dense.iter().zip(nulls) {
            let value = if *is_null { None } else { Some(*value) };
            runs.push_run(value, 1)?;
        }
        Ok(Self::from_canonical(runs))
    }

    /// Lazily yield every element in order.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.runs().elements().copied()
    }

    pub fn to_values(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.dimension() as usize);
        values.extend(self.iter());
        values
    }

    /// Expand into plain doubles, writing `fill` in place of NVP.
    pub fn to_dense(&self, fill: f64) -> Vec<f64> {
        self.iter().map(|value| value.unwrap_or(fill)).collect()
    }
}

impl TryFrom<&[f64]> for SparseVector {
    type Error = Report;

    fn try_from(dense: &[f64]) -> Result<Self> {
        SparseVector::from_dense(dense)
    }
}

impl TryFrom<&[f64]> for Svec {
    type Error = Report;

    fn try_from(dense: &[f64]) -> Result<Self> {
        Ok(Svec::Vector(SparseVector::from_dense(dense)?))
    }
}
