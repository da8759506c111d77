use std::marker::PhantomData;

use ::impl_tools::autoimpl;
use eyre::{ensure, eyre, Result};
use itertools::izip;

use svec_core_rs::num::PrimUInt;

use super::{Identical, RleVec};

/// Operation applied to the values of all inputs at a given position.
#[autoimpl(for <M: trait + ?Sized> &mut M, Box<M>)]
pub trait Merge<T> {
    fn multiple(&mut self, vals: &[&T]) -> T;
}

pub struct MergeFn<T, Multiple>
where
    Multiple: FnMut(&[&T]) -> T,
{
    multiple_fn: Multiple,
    _phantom: PhantomData<T>,
}

impl<T, Multiple> MergeFn<T, Multiple>
where
    Multiple: FnMut(&[&T]) -> T,
{
    pub fn new(multiple_fn: Multiple) -> Self {
        Self {
            multiple_fn,
            _phantom: Default::default(),
        }
    }
}

impl<T, Multiple> Merge<T> for MergeFn<T, Multiple>
where
    Multiple: FnMut(&[&T]) -> T,
{
    #[inline(always)]
    fn multiple(&mut self, vals: &[&T]) -> T {
        (self.multiple_fn)(vals)
    }
}

/// Merge any number of equal-length vectors in a single sweep over their runs.
pub fn merge<'a, V, L, M, IOriginal, INew>(
    inputs: impl IntoIterator<Item = &'a RleVec<V, L, IOriginal>>,
) -> MergeSetup<'a, V, L, M, IOriginal, INew>
where
    V: 'a,
    L: PrimUInt + 'a,
    M: Merge<V>,
    IOriginal: Identical<V> + 'a,
    INew: Identical<V>,
{
    MergeSetup {
        inputs: inputs.into_iter().collect(),
        identical: None,
        merge: None,
    }
}

pub struct MergeSetup<'a, V, L: PrimUInt, M: Merge<V>, IOriginal: Identical<V>, INew: Identical<V>>
{
    inputs: Vec<&'a RleVec<V, L, IOriginal>>,
    identical: Option<INew>,
    merge: Option<M>,
}

impl<V, L: PrimUInt, M: Merge<V>, IOriginal: Identical<V>, INew: Identical<V>>
    MergeSetup<'_, V, L, M, IOriginal, INew>
{
    pub fn with_identical(mut self, identical: INew) -> Self {
        self.identical = Some(identical);
        self
    }

    pub fn with_merge(mut self, merge: M) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn run(mut self) -> Result<RleVec<V, L, INew>> {
        let merge_fn = self
            .merge
            .take()
            .ok_or_else(|| eyre!("Merge function is unspecified in rle_vec::merge."))?;
        let identical = self
            .identical
            .take()
            .ok_or_else(|| eyre!("Identical rule is unspecified in rle_vec::merge."))?;

        let rle = RleVec::builder(identical).build();

        merge_impl(&self.inputs, rle, merge_fn)
    }
}

fn merge_impl<V, L, IOriginal, INew>(
    inputs: &[&RleVec<V, L, IOriginal>],
    mut append_to: RleVec<V, L, INew>,
    mut merge: impl Merge<V>,
) -> Result<RleVec<V, L, INew>>
where
    L: PrimUInt,
    IOriginal: Identical<V>,
    INew: Identical<V>,
{
    let total = match inputs.first() {
        None => return Ok(append_to),
        Some(rle) => rle.total_length(),
    };
    for (ind, rle) in inputs.iter().enumerate() {
        ensure!(
            rle.total_length() == total,
            "All merged vectors must have the same length: vector #{} has length {}, expected {}",
            ind + 1,
            rle.total_length(),
            total
        );
    }
    if total == 0 {
        return Ok(append_to);
    }

    // Iterators + cached current values and their end positions
    let mut iterators = Vec::with_capacity(inputs.len());
    let mut iter_ends = Vec::with_capacity(inputs.len());
    let mut iter_vals = Vec::with_capacity(inputs.len());
    for rle in inputs {
        let mut runs = rle.runs();
        let (val, length) = runs
            .next()
            .ok_or_else(|| eyre!("Non-empty vector has no runs"))?;
        iter_vals.push(val);
        iter_ends.push(length.widen());
        iterators.push(runs);
    }

    let mut current_end = 0;
    while current_end < total {
        // Next end is a min among active run ends
        let new_end = *iter_ends
            .iter()
            .min()
            .ok_or_else(|| eyre!("No active runs left in rle_vec::merge"))?;
        debug_assert!(new_end > current_end);

        append_to.push_run(
            merge.multiple(&iter_vals),
            L::narrow(new_end - current_end)?,
        )?;
        current_end = new_end;

        // Push finished runs forward. All inputs are exhausted at the same time.
        for (iter, end, val) in izip!(&mut iterators, &mut iter_ends, &mut iter_vals) {
            if *end == current_end {
                if let Some((v, l)) = iter.next() {
                    *val = v;
                    *end += l.widen();
                }
            }
        }
    }

    Ok(append_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    type RleVector = RleVec<u8, u8, fn(&u8, &u8) -> bool>;

    fn maximum(values: &[&u8]) -> u8 {
        values.iter().map(|x| **x).max().unwrap_or_default()
    }

    fn from_dense(values: &[u8]) -> RleVector {
        RleVector::builder(PartialEq::eq)
            .with_dense_values(values)
            .unwrap()
            .build()
    }

    fn test_merge<'a>(rles: impl IntoIterator<Item = &'a RleVector>) -> Result<RleVector> {
        merge(rles)
            .with_merge(MergeFn::new(maximum))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run()
    }

    fn assert_rle_eq(vec: RleVector, items: Vec<(u8, u8)>) {
        assert_eq!(vec.runs().map(|(x, y)| (*x, *y)).collect::<Vec<_>>(), items);
    }

    #[test]
    fn test_rle_vec_merge_no_inputs() -> Result<()> {
        let merged = test_merge(&[])?;
        assert!(merged.is_empty());
        Ok(())
    }

    #[test]
    fn test_rle_vec_merge_multiple_empty() -> Result<()> {
        let merged = test_merge(&[from_dense(&[]), from_dense(&[])])?;
        assert!(merged.is_empty());
        Ok(())
    }

    #[test]
    fn test_rle_vec_merge_single() -> Result<()> {
        let rle = from_dense(&[1, 2, 2, 3, 3, 3]);
        let merged = test_merge(&[rle.clone()])?;
        assert_eq!(merged, rle);
        Ok(())
    }

    #[test]
    fn test_rle_vec_merge_multiple() -> Result<()> {
        let rle1 = from_dense(&[1, 2, 3, 4, 5, 5, 4, 0, 0]);
        let rle2 = from_dense(&[5, 5, 5, 5, 5, 1, 1, 1, 1]);
        let rle3 = from_dense(&[0, 0, 0, 0, 0, 0, 0, 10, 1]);

        let merged = test_merge(&[rle1, rle2, rle3])?;
        assert_rle_eq(merged, vec![(5, 6), (4, 1), (10, 1), (1, 1)]);
        Ok(())
    }

    #[test]
    fn test_rle_vec_merge_counts() -> Result<()> {
        let rles = [
            from_dense(&[0, 1, 5]),
            from_dense(&[10, 0, 3]),
            from_dense(&[0, 0, 3]),
            from_dense(&[0, 1, 0]),
        ];

        let merged = merge(&rles)
            .with_merge(MergeFn::new(|vals: &[&u8]| {
                vals.iter().filter(|x| ***x != 0).count() as u8
            }))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run()?;
        assert_rle_eq(merged, vec![(1, 1), (2, 1), (3, 1)]);
        Ok(())
    }

    #[test]
    fn test_rle_vec_merge_length_mismatch() {
        let result = test_merge(&[from_dense(&[1, 2]), from_dense(&[1, 2, 3])]);
        assert!(result.is_err());
    }
}
