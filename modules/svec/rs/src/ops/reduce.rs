use eyre::{bail, Result};

use super::Operator;
use crate::error::Error;
use crate::svec::{SparseVector, Svec};
use crate::value::{is_nonzero, Value};

impl SparseVector {
    /// Sum of `count * f(value)` over runs; NVP anywhere gives NVP.
    fn weighted_sum(&self, f: impl Fn(f64) -> f64) -> Value {
        self.counts()
            .zip(self.values())
            .try_fold(0.0, |total, (count, value)| {
                Some(total + count as f64 * f(value?))
            })
    }

    /// Sum of all elements.
    pub fn summate(&self) -> Value {
        self.weighted_sum(|x| x)
    }

    pub fn l1norm(&self) -> Value {
        self.weighted_sum(f64::abs)
    }

    pub fn l2norm(&self) -> Value {
        self.weighted_sum(|x| x * x).map(f64::sqrt)
    }

    /// Number of elements that are neither NVP nor zero.
    pub fn count(&self) -> u64 {
        self.runs()
            .runs()
            .filter(|(value, _)| is_nonzero(value))
            .map(|(_, count)| *count)
            .sum()
    }

    /// Average element, NVP for empty vectors.
    pub fn mean(&self) -> Value {
        if self.is_empty() {
            return None;
        }
        Some(self.summate()? / self.dimension() as f64)
    }

    pub fn dot(&self, other: &SparseVector) -> Result<Value> {
        Ok(self.combine(other, Operator::Mul)?.summate())
    }
}

impl Svec {
    /// Sum of the elementwise product. A scalar operand is broadcast; two scalars have no
    /// dimension to reduce over.
    pub fn dot(&self, other: &Svec) -> Result<Value> {
        if self.is_scalar() && other.is_scalar() {
            bail!(Error::unsupported("dot product of two scalars"));
        }
        self.combine(other, Operator::Mul)?.summate()
    }

    /// Dot product with a plain array.
    pub fn dot_dense(&self, dense: &[f64]) -> Result<Value> {
        self.dot(&Svec::try_from(dense)?)
    }

    pub fn summate(&self) -> Result<Value> {
        Ok(self.as_vector()?.summate())
    }

    pub fn l1norm(&self) -> Result<Value> {
        Ok(self.as_vector()?.l1norm())
    }

    pub fn l2norm(&self) -> Result<Value> {
        Ok(self.as_vector()?.l2norm())
    }

    pub fn count(&self) -> Result<u64> {
        Ok(self.as_vector()?.count())
    }

    pub fn mean(&self) -> Result<Value> {
        Ok(self.as_vector()?.mean())
    }
}
