use std::ops;

use eyre::{bail, Result};

use svec_collections_rs::rle_vec::{self, Merge2, Merge2Fn, Operand};

use super::Operator;
use crate::error::Error;
use crate::svec::{SparseVector, Svec};
use crate::value::{NvpIdentical, Value};

type Side<'a> = Operand<'a, Value, u64, NvpIdentical>;

fn merge_runs(first: Side<'_>, second: Side<'_>, merge: impl Merge2<Value>) -> Result<SparseVector> {
    let runs = rle_vec::merge2(first, second)
        .with_merge2(merge)
        .with_identical(NvpIdentical)
        .run()?;
    Ok(SparseVector::from_canonical(runs))
}

impl SparseVector {
    /// Elementwise `self op other`. Both vectors must have the same dimension.
    pub fn combine(&self, other: &SparseVector, op: Operator) -> Result<SparseVector> {
        self.combine_by(other, op)
    }

    /// Elementwise `self op scalar`, the scalar repeated over every position.
    pub fn combine_scalar(&self, scalar: Value, op: Operator) -> Result<SparseVector> {
        merge_runs(self.runs().into(), Operand::Broadcast(&scalar), op)
    }

    fn combine_by(&self, other: &SparseVector, merge: impl Merge2<Value>) -> Result<SparseVector> {
        if self.dimension() != other.dimension() {
            bail!(Error::DimensionMismatch {
                left: self.dimension(),
                right: other.dimension()
            });
        }
        merge_runs(self.runs().into(), other.runs().into(), merge)
    }
}

impl Svec {
    /// Elementwise `self op other`, broadcasting scalar operands. Two scalars give a scalar.
    pub fn combine(&self, other: &Svec, op: Operator) -> Result<Svec> {
        self.combine_by(other, op)
    }

    /// Like `combine`, but with a custom operator. `f` is never called with NVP: NVP on either
    /// side yields NVP.
    pub fn combine_with(&self, other: &Svec, mut f: impl FnMut(f64, f64) -> f64) -> Result<Svec> {
        let merge = Merge2Fn::new(|first: &Value, second: &Value| match (first, second) {
            (Some(first), Some(second)) => Some(f(*first, *second)),
            _ => None,
        });
        self.combine_by(other, merge)
    }

    /// Elementwise `self op dense`, the plain array encoded first. Use `Svec::try_from` on the
    /// array to put it on the left-hand side.
    pub fn combine_dense(&self, dense: &[f64], op: Operator) -> Result<Svec> {
        self.combine(&Svec::try_from(dense)?, op)
    }

    fn combine_by(&self, other: &Svec, mut merge: impl Merge2<Value>) -> Result<Svec> {
        let result = match (self, other) {
            (Svec::Vector(first), Svec::Vector(second)) => first.combine_by(second, merge)?,
            (Svec::Vector(first), Svec::Scalar(second)) => {
                merge_runs(first.runs().into(), Operand::Broadcast(second), merge)?
            }
            (Svec::Scalar(first), Svec::Vector(second)) => {
                merge_runs(Operand::Broadcast(first), second.runs().into(), merge)?
            }
            (Svec::Scalar(first), Svec::Scalar(second)) => {
                return Ok(Svec::Scalar(merge.two(first, second)));
            }
        };
        Ok(Svec::Vector(result))
    }
}

macro_rules! impl_binary_op {
    ($($trait:ident, $method:ident => $op:expr;)*) => {
        $(
            impl ops::$trait for &Svec {
                type Output = Result<Svec>;

                fn $method(self, rhs: &Svec) -> Result<Svec> {
                    self.combine(rhs, $op)
                }
            }

            impl ops::$trait for &SparseVector {
                type Output = Result<SparseVector>;

                fn $method(self, rhs: &SparseVector) -> Result<SparseVector> {
                    self.combine(rhs, $op)
                }
            }
        )*
    };
}

impl_binary_op! {
    Add, add => Operator::Add;
    Sub, sub => Operator::Sub;
    Mul, mul => Operator::Mul;
    Div, div => Operator::Div;
}
