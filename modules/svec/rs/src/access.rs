//! Positional operations. Positions are 1-based and ranges are inclusive.

use eyre::{bail, Result};

use crate::error::Error;
use crate::ops::UnaryFn;
use crate::svec::{SparseVector, Svec};
use crate::value::Value;

impl SparseVector {
    /// Element at `index`. Walks the runs, O(runs).
    pub fn projection(&self, index: u64) -> Result<Value> {
        if index < 1 || index > self.dimension() {
            bail!(Error::invalid_range(format!(
                "index {index} is outside [1, {}]",
                self.dimension()
            )));
        }
        match self.runs().get(index - 1) {
            Some(value) => Ok(*value),
            None => bail!(Error::invalid_range(format!("index {index} is not covered by runs"))),
        }
    }

    /// Elements `start..=end`. An `end` past the last element is clamped.
    pub fn subvector(&self, start: u64, end: u64) -> Result<SparseVector> {
        if start < 1 || start > end || start > self.dimension() {
            bail!(Error::invalid_range(format!(
                "[{start}, {end}] is not a valid range for a vector of dimension {}",
                self.dimension()
            )));
        }
        let end = end.min(self.dimension());
        let runs = self.runs().slice(start - 1, end)?;
        Ok(SparseVector::from_canonical(runs))
    }

    /// Copy of `self` with elements starting at `offset` overwritten by `replacement`.
    pub fn change(&self, offset: u64, replacement: &SparseVector) -> Result<SparseVector> {
        let fits = offset >= 1
            && offset
                .checked_add(replacement.dimension())
                .is_some_and(|end| end - 1 <= self.dimension());
        if !fits {
            bail!(Error::invalid_range(format!(
                "replacement of dimension {} at {offset} doesn't fit into dimension {}",
                replacement.dimension(),
                self.dimension()
            )));
        }
        let runs = self.runs().splice(offset - 1, replacement.runs())?;
        Ok(SparseVector::from_canonical(runs))
    }

    /// Apply `f` once per run. NVP is kept as is, runs that map to identical values are merged.
    pub fn lapply(&self, mut f: impl FnMut(f64) -> f64) -> Result<SparseVector> {
        let runs = self.runs().map(|value| value.map(&mut f))?;
        Ok(SparseVector::from_canonical(runs))
    }

    pub fn lapply_named(&self, name: &str) -> Result<SparseVector> {
        let function: UnaryFn = name.parse()?;
        self.lapply(|x| function.apply(x))
    }

    /// Append one element.
    pub fn pivot(&self, value: Value) -> Result<SparseVector> {
        if self.dimension() == u64::MAX {
            bail!(Error::invalid_range("vector already has the maximal dimension"));
        }
        let mut runs = self.runs().clone();
        runs.push_run(value, 1)?;
        Ok(SparseVector::from_canonical(runs))
    }

    /// Every element in order, one at a time.
    pub fn unnest(&self) -> impl Iterator<Item = Value> + '_ {
        self.iter()
    }
}

impl Svec {
    pub fn projection(&self, index: u64) -> Result<Value> {
        self.as_vector()?.projection(index)
    }

    pub fn subvector(&self, start: u64, end: u64) -> Result<Svec> {
        Ok(Svec::Vector(self.as_vector()?.subvector(start, end)?))
    }

    pub fn change(&self, offset: u64, replacement: &Svec) -> Result<Svec> {
        let replacement = replacement.as_vector()?;
        Ok(Svec::Vector(self.as_vector()?.change(offset, replacement)?))
    }

    /// Map every element. A scalar maps to a scalar.
    pub fn lapply(&self, mut f: impl FnMut(f64) -> f64) -> Result<Svec> {
        match self {
            Svec::Scalar(value) => Ok(Svec::Scalar(value.map(f))),
            Svec::Vector(vector) => Ok(Svec::Vector(vector.lapply(&mut f)?)),
        }
    }

    pub fn lapply_named(&self, name: &str) -> Result<Svec> {
        let function: UnaryFn = name.parse()?;
        self.lapply(|x| function.apply(x))
    }

    pub fn pivot(&self, value: Value) -> Result<Svec> {
        Ok(Svec::Vector(self.as_vector()?.pivot(value)?))
    }
}
