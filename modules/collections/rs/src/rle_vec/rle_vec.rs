use std::iter::{repeat_n, Zip};
use std::vec::IntoIter;

use derive_getters::Dissolve;
use eyre::{bail, ensure, eyre, Result};

use svec_core_rs::num::PrimUInt;

use super::identical::Identical;

pub struct RleVecBuilder<V, L: PrimUInt, I: Identical<V>> {
    values: Option<Vec<V>>,
    lengths: Option<Vec<L>>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVecBuilder<V, L, I> {
    pub fn new(identical: I) -> Self {
        Self {
            values: None,
            lengths: None,
            identical,
        }
    }

    pub fn with_capacity(mut self, runs: usize) -> Self {
        self.values = Some(Vec::with_capacity(runs));
        self.lengths = Some(Vec::with_capacity(runs));
        self
    }

    /// Use already segmented runs. Every length must be positive, but neighbouring runs are allowed
    /// to be identical: call `build_canonical` to merge them.
    pub fn with_rle_values(mut self, values: Vec<V>, lengths: Vec<L>) -> Result<Self> {
        ensure!(
            values.len() == lengths.len(),
            "Values and lengths must have the same length, got {} and {}",
            values.len(),
            lengths.len()
        );
        if let Some(ind) = lengths.iter().position(|x| x.is_zero()) {
            bail!("Run lengths must be positive, got 0 for the run #{}", ind + 1);
        }

        self.values = Some(values);
        self.lengths = Some(lengths);
        Ok(self)
    }

    pub fn with_dense_values(mut self, dense: &[V]) -> Result<Self>
    where
        V: Clone,
    {
        let mut values = self.values.take().unwrap_or_default();
        values.clear();
        let mut lengths = self.lengths.take().unwrap_or_default();
        lengths.clear();

        let mut dense = dense.iter();
        if let Some(first) = dense.next() {
            let mut current = first;
            let mut length: u64 = 1;

            for value in dense {
                if self.identical.identical(current, value) {
                    length += 1;
                } else {
                    values.push(current.clone());
                    lengths.push(L::narrow(length)?);

                    current = value;
                    length = 1;
                }
            }

            values.push(current.clone());
            lengths.push(L::narrow(length)?);
        }
        debug_assert_eq!(values.len(), lengths.len());

        self.values = Some(values);
        self.lengths = Some(lengths);
        Ok(self)
    }

    pub fn build(self) -> RleVec<V, L, I> {
        RleVec {
            values: self.values.unwrap_or_default(),
            lengths: self.lengths.unwrap_or_default(),
            identical: self.identical,
        }
    }

    /// Build and merge every pair of adjacent identical runs.
    pub fn build_canonical(self) -> Result<RleVec<V, L, I>> {
        let mut rle = self.build();
        rle.canonicalize()?;
        Ok(rle)
    }
}

/// Run-length encoded vector stored as two parallel arrays: run values and run lengths.
///
/// All producers in this module (builders, `push_run`, `slice`, `splice`, `map`, and the
/// `merge`/`merge2` combiners) keep the vector canonical with respect to its `Identical` rule:
/// every length is positive and no two adjacent runs are identical. `push` is the only escape
/// hatch and leaves canonical form up to the caller.
#[derive(Debug, Clone, Default, Dissolve)]
pub struct RleVec<V, L: PrimUInt, I: Identical<V>> {
    values: Vec<V>,
    lengths: Vec<L>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVec<V, L, I> {
    pub fn builder(identical: I) -> RleVecBuilder<V, L, I> {
        RleVecBuilder::new(identical)
    }

    pub fn identical(&self, first: &V, second: &V) -> bool {
        self.identical.identical(first, second)
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Number of encoded elements, i.e. the sum of all run lengths. Saturates at `u64::MAX`.
    pub fn total_length(&self) -> u64 {
        self.lengths
            .iter()
            .fold(0u64, |total, x| total.saturating_add(x.widen()))
    }

    /// Sum of all run lengths, `None` if it doesn't fit into u64.
    pub fn checked_total_length(&self) -> Option<u64> {
        self.lengths
            .iter()
            .try_fold(0u64, |total, x| total.checked_add(x.widen()))
    }

    /// Append a run as-is.
    pub fn push(&mut self, value: V, length: L) {
        self.values.push(value);
        self.lengths.push(length);
    }

    /// Append a run, extending the last one if the values are identical. Empty runs are skipped.
    pub fn push_run(&mut self, value: V, length: L) -> Result<()> {
        if length.is_zero() {
            return Ok(());
        }

        if let (Some(last_value), Some(last_length)) = (self.values.last(), self.lengths.last_mut())
        {
            if self.identical.identical(last_value, &value) {
                let merged = (*last_length)
                    .widen()
                    .checked_add(length.widen())
                    .ok_or_else(|| eyre!("Run length overflows u64"))?;
                *last_length = L::narrow(merged)?;
                return Ok(());
            }
        }

        self.values.push(value);
        self.lengths.push(length);
        Ok(())
    }

    /// Append canonical runs. Only the seam between the current tail and the first new run can
    /// hold identical neighbours, so only the seam is checked.
    pub fn concat(&mut self, runs: impl IntoIterator<Item = (V, L)>) -> Result<()> {
        let mut runs = runs.into_iter().filter(|(_, length)| !length.is_zero());
        if let Some((value, length)) = runs.next() {
            self.push_run(value, length)?;
        }
        for (value, length) in runs {
            self.push(value, length);
        }
        Ok(())
    }

    pub fn runs(&self) -> impl Iterator<Item = (&V, &L)> {
        self.values.iter().zip(self.lengths.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    pub fn lengths(&self) -> impl Iterator<Item = &L> {
        self.lengths.iter()
    }

    /// Lazily expand runs into individual elements.
    pub fn elements(&self) -> impl Iterator<Item = &V> {
        self.runs()
            .flat_map(|(value, length)| repeat_n(value, length.widen() as usize))
    }

    pub fn is_canonical(&self) -> bool {
        self.lengths.iter().all(|x| !x.is_zero())
            && self
                .values
                .windows(2)
                .all(|pair| !self.identical.identical(&pair[0], &pair[1]))
    }

    /// Merge all adjacent identical runs in place. Returns the number of runs that were absorbed.
    pub fn canonicalize(&mut self) -> Result<usize> {
        if self.values.len() < 2 {
            return Ok(0);
        }

        let mut write = 0;
        for read in 1..self.values.len() {
            if self
                .identical
                .identical(&self.values[write], &self.values[read])
            {
                let merged = self.lengths[write]
                    .widen()
                    .checked_add(self.lengths[read].widen())
                    .ok_or_else(|| eyre!("Merged run length overflows u64"))?;
                self.lengths[write] = L::narrow(merged)?;
            } else {
                write += 1;
                self.values.swap(write, read);
                self.lengths[write] = self.lengths[read];
            }
        }

        let absorbed = self.values.len() - (write + 1);
        self.values.truncate(write + 1);
        self.lengths.truncate(write + 1);
        Ok(absorbed)
    }

    /// Find the run covering a 0-based element position.
    /// Returns the run index and the offset of the position inside that run.
    pub fn locate(&self, position: u64) -> Option<(usize, u64)> {
        let mut start = 0;
        for (ind, length) in self.lengths.iter().enumerate() {
            let end = start + length.widen();
            if position < end {
                return Some((ind, position - start));
            }
            start = end;
        }
        None
    }

    pub fn get(&self, position: u64) -> Option<&V> {
        self.locate(position).map(|(ind, _)| &self.values[ind])
    }

    /// Runs covering the half-open element range [start, end). Boundary runs are truncated,
    /// interior runs are copied unchanged.
    pub fn slice(&self, start: u64, end: u64) -> Result<Self>
    where
        V: Clone,
        I: Clone,
    {
        let total = self.total_length();
        ensure!(
            start <= end && end <= total,
            "Range [{}, {}) is out of bounds for a vector of length {}",
            start,
            end,
            total
        );

        let mut result = RleVec::builder(self.identical.clone()).build();
        if start == end {
            return Ok(result);
        }

        let mut run_start = 0;
        for (value, length) in self.runs() {
            let run_end = run_start + length.widen();
            if run_end > start {
                let length = run_end.min(end) - run_start.max(start);
                result.push_run(value.clone(), L::narrow(length)?)?;
            }
            if run_end >= end {
                break;
            }
            run_start = run_end;
        }
        Ok(result)
    }

    /// Replace elements [at, at + replacement.total_length()) with the replacement runs.
    pub fn splice(&self, at: u64, replacement: &Self) -> Result<Self>
    where
        V: Clone,
        I: Clone,
    {
        let total = self.total_length();
        let end = at
            .checked_add(replacement.total_length())
            .filter(|end| *end <= total)
            .ok_or_else(|| {
                eyre!(
                    "Replacement of length {} at {} doesn't fit into a vector of length {}",
                    replacement.total_length(),
                    at,
                    total
                )
            })?;

        let mut result = self.slice(0, at)?;
        result.concat(replacement.runs().map(|(value, length)| (value.clone(), *length)))?;
        result.concat(self.slice(end, total)?)?;
        Ok(result)
    }

    /// Apply `f` once per run. Runs whose mapped values become identical are merged.
    pub fn map(&self, mut f: impl FnMut(&V) -> V) -> Result<Self>
    where
        I: Clone,
    {
        let mut result = RleVec::builder(self.identical.clone())
            .with_capacity(self.len())
            .build();
        for (value, length) in self.runs() {
            result.push_run(f(value), *length)?;
        }
        Ok(result)
    }
}

impl<V: PartialEq, L: PrimUInt, I: Identical<V>> PartialEq for RleVec<V, L, I> {
    fn eq(&self, other: &Self) -> bool {
        self.lengths == other.lengths && self.values == other.values
    }
}

impl<V, L: PrimUInt, I: Identical<V>> IntoIterator for RleVec<V, L, I> {
    type Item = (V, L);
    type IntoIter = Zip<IntoIter<V>, IntoIter<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter().zip(self.lengths)
    }
}
