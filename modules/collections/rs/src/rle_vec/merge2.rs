use std::marker::PhantomData;

use ::impl_tools::autoimpl;
use eyre::{bail, ensure, eyre, Result};

use svec_core_rs::num::PrimUInt;

use super::{Identical, RleVec};

/// Elementwise binary operation applied once per aligned pair of runs.
#[autoimpl(for <M: trait + ?Sized> &mut M, Box<M>)]
pub trait Merge2<T> {
    fn two(&mut self, first: &T, second: &T) -> T;
}

pub struct Merge2Fn<T, Two>
where
    Two: FnMut(&T, &T) -> T,
{
    two_fn: Two,
    _phantom: PhantomData<T>,
}

impl<T, Two> Merge2Fn<T, Two>
where
    Two: FnMut(&T, &T) -> T,
{
    pub fn new(two_fn: Two) -> Self {
        Self {
            two_fn,
            _phantom: Default::default(),
        }
    }
}

impl<T, Two> Merge2<T> for Merge2Fn<T, Two>
where
    Two: FnMut(&T, &T) -> T,
{
    #[inline(always)]
    fn two(&mut self, first: &T, second: &T) -> T {
        (self.two_fn)(first, second)
    }
}

/// One side of a `merge2` call: either a run-length vector or a single value repeated to match
/// the length of the other side.
pub enum Operand<'a, V, L: PrimUInt, I: Identical<V>> {
    Runs(&'a RleVec<V, L, I>),
    Broadcast(&'a V),
}

impl<'a, V, L: PrimUInt, I: Identical<V>> From<&'a RleVec<V, L, I>> for Operand<'a, V, L, I> {
    fn from(rle: &'a RleVec<V, L, I>) -> Self {
        Operand::Runs(rle)
    }
}

pub fn merge2<'a, V, L, M, IOriginal, INew>(
    first: impl Into<Operand<'a, V, L, IOriginal>>,
    second: impl Into<Operand<'a, V, L, IOriginal>>,
) -> Merge2Setup<'a, V, L, M, IOriginal, INew>
where
    L: PrimUInt,
    M: Merge2<V>,
    IOriginal: Identical<V> + 'a,
    INew: Identical<V>,
{
    Merge2Setup {
        first: first.into(),
        second: second.into(),
        identical: None,
        merge: None,
    }
}

pub struct Merge2Setup<
    'a,
    V,
    L: PrimUInt,
    M: Merge2<V>,
    IOriginal: Identical<V>,
    INew: Identical<V>,
> {
    first: Operand<'a, V, L, IOriginal>,
    second: Operand<'a, V, L, IOriginal>,
    identical: Option<INew>,
    merge: Option<M>,
}

impl<V, L: PrimUInt, M: Merge2<V>, IOriginal: Identical<V>, INew: Identical<V>>
    Merge2Setup<'_, V, L, M, IOriginal, INew>
{
    pub fn with_identical(mut self, identical: INew) -> Self {
        self.identical = Some(identical);
        self
    }

    pub fn with_merge2(mut self, merge: M) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn run(mut self) -> Result<RleVec<V, L, INew>> {
        let merge = self
            .merge
            .take()
            .ok_or_else(|| eyre!("Merge function is unspecified in rle_vec::merge2."))?;
        let identical = self
            .identical
            .take()
            .ok_or_else(|| eyre!("Identical rule is unspecified in rle_vec::merge2."))?;

        let rle = RleVec::builder(identical).build();

        match (self.first, self.second) {
            (Operand::Runs(first), Operand::Runs(second)) => {
                merge2_impl(first, second, rle, merge)
            }
            (Operand::Runs(first), Operand::Broadcast(second)) => {
                broadcast_impl(first, second, rle, merge, |m, run, value| m.two(run, value))
            }
            (Operand::Broadcast(first), Operand::Runs(second)) => {
                broadcast_impl(second, first, rle, merge, |m, run, value| m.two(value, run))
            }
            (Operand::Broadcast(_), Operand::Broadcast(_)) => {
                bail!("At least one rle_vec::merge2 operand must be a run-length vector")
            }
        }
    }
}

fn merge2_impl<V, L, IOriginal, INew>(
    first: &RleVec<V, L, IOriginal>,
    second: &RleVec<V, L, IOriginal>,
    mut append_to: RleVec<V, L, INew>,
    mut merge: impl Merge2<V>,
) -> Result<RleVec<V, L, INew>>
where
    L: PrimUInt,
    IOriginal: Identical<V>,
    INew: Identical<V>,
{
    ensure!(
        first.total_length() == second.total_length(),
        "Vectors must have the same length to be merged, got {} and {}",
        first.total_length(),
        second.total_length()
    );

    let mut first = first.runs();
    let mut second = second.runs();

    // Current run value + number of elements left in it
    let (mut first_val, mut first_left) = match first.next() {
        None => return Ok(append_to),
        Some((v, l)) => (v, l.widen()),
    };
    let (mut second_val, mut second_left) = match second.next() {
        None => bail!("Non-empty vector has zero length"),
        Some((v, l)) => (v, l.widen()),
    };

    loop {
        // The next output run ends where the shortest of the two current runs ends
        let step = first_left.min(second_left);
        append_to.push_run(merge.two(first_val, second_val), L::narrow(step)?)?;

        first_left -= step;
        second_left -= step;

        if first_left == 0 {
            match first.next() {
                None => break,
                Some((v, l)) => {
                    first_val = v;
                    first_left = l.widen();
                }
            }
        }
        if second_left == 0 {
            match second.next() {
                None => break,
                Some((v, l)) => {
                    second_val = v;
                    second_left = l.widen();
                }
            }
        }
    }
    debug_assert!(first.next().is_none() && second.next().is_none());

    Ok(append_to)
}

fn broadcast_impl<V, L, IOriginal, INew, M>(
    runs: &RleVec<V, L, IOriginal>,
    value: &V,
    mut append_to: RleVec<V, L, INew>,
    mut merge: M,
    apply: impl Fn(&mut M, &V, &V) -> V,
) -> Result<RleVec<V, L, INew>>
where
    L: PrimUInt,
    IOriginal: Identical<V>,
    INew: Identical<V>,
    M: Merge2<V>,
{
    for (run, length) in runs.runs() {
        append_to.push_run(apply(&mut merge, run, value), *length)?;
    }
    Ok(append_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    type RleVector = RleVec<u8, u8, fn(&u8, &u8) -> bool>;

    fn maximum(val1: &u8, val2: &u8) -> u8 {
        *val1.max(val2)
    }

    fn from_dense(values: &[u8]) -> RleVector {
        RleVector::builder(PartialEq::eq)
            .with_dense_values(values)
            .unwrap()
            .build()
    }

    fn runs_of(rle: &RleVector) -> Vec<(u8, u8)> {
        rle.runs().map(|(x, y)| (*x, *y)).collect()
    }

    fn assert_merged_eq(vec1: &RleVector, vec2: &RleVector, items: Vec<(u8, u8)>) {
        for (first, second) in [(vec1, vec2), (vec2, vec1)] {
            let merged = merge2(first, second)
                .with_merge2(Merge2Fn::new(maximum))
                .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
                .run()
                .unwrap();
            assert_eq!(runs_of(&merged), items);
            assert!(merged.is_canonical());
        }
    }

    #[test]
    fn test_rle_vec_merge2_both_empty() {
        let rle = from_dense(&[]);
        assert_merged_eq(&rle, &rle.clone(), vec![]);
    }

    #[test]
    fn test_rle_vec_merge2_resegments() {
        let rle1 = from_dense(&[3, 3, 3]);
        let rle2 = from_dense(&[1, 2, 4]);
        assert_merged_eq(&rle1, &rle2, vec![(3, 2), (4, 1)]);

        let rle1 = from_dense(&[3, 4, 5, 6, 6, 6]);
        let rle2 = from_dense(&[1, 2, 3, 4, 5, 6]);
        assert_merged_eq(&rle1, &rle2, vec![(3, 1), (4, 1), (5, 1), (6, 3)]);

        let rle1 = from_dense(&[0, 0, 0, 0, 9, 9, 0, 0]);
        let rle2 = from_dense(&[0, 0, 1, 1, 1, 1, 1, 0]);
        assert_merged_eq(&rle1, &rle2, vec![(0, 2), (1, 2), (9, 2), (1, 1), (0, 1)]);
    }

    #[test]
    fn test_rle_vec_merge2_identical_instances() {
        let rle = from_dense(&[1, 2, 2, 3]);
        assert_merged_eq(&rle, &rle, vec![(1, 1), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_rle_vec_merge2_length_mismatch() {
        let rle1 = from_dense(&[1, 1, 2]);
        let rle2 = from_dense(&[1, 1]);
        let result = merge2(&rle1, &rle2)
            .with_merge2(Merge2Fn::new(maximum))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run();
        assert!(result.is_err());
    }

    #[test]
    fn test_rle_vec_merge2_broadcast() -> Result<()> {
        let rle = from_dense(&[1, 1, 5, 2, 2, 7]);

        let merged = merge2(&rle, Operand::Broadcast(&3))
            .with_merge2(Merge2Fn::new(maximum))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run()?;
        assert_eq!(runs_of(&merged), vec![(3, 2), (5, 1), (3, 2), (7, 1)]);

        // Order of operands is preserved for non-commutative operations
        let merged = merge2(Operand::Broadcast(&10), &rle)
            .with_merge2(Merge2Fn::new(|a: &u8, b: &u8| a - b))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run()?;
        assert_eq!(runs_of(&merged), vec![(9, 2), (5, 1), (8, 2), (3, 1)]);

        let one: Operand<u8, u8, fn(&u8, &u8) -> bool> = Operand::Broadcast(&1);
        let two: Operand<u8, u8, fn(&u8, &u8) -> bool> = Operand::Broadcast(&2);
        let both = merge2(one, two)
            .with_merge2(Merge2Fn::new(maximum))
            .with_identical(PartialEq::eq as fn(&u8, &u8) -> bool)
            .run();
        assert!(both.is_err());
        Ok(())
    }
}
