use svec_collections_rs::rle_vec::Identical;

/// A single element. `None` is NVP ("no value present"), the null of this engine.
pub type Value = Option<f64>;

pub const NVP: Value = None;

/// Run identity for `Value`s: NVP only matches NVP, numbers use float equality, and NaN matches
/// NaN so that runs of NaN compress like any other value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NvpIdentical;

impl Identical<Value> for NvpIdentical {
    #[inline]
    fn identical(&self, first: &Value, second: &Value) -> bool {
        match (first, second) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

/// Neither NVP nor exactly zero.
#[inline]
pub(crate) fn is_nonzero(value: &Value) -> bool {
    matches!(value, Some(x) if *x != 0.0)
}
