/// The rule deciding whether two neighbouring values belong to the same run.
///
/// Every producer of an `RleVec` consults this rule before starting a new run, so the rule defines
/// what "canonical" means for a given vector. It doesn't have to be `PartialEq`: float payloads,
/// for instance, often want NaN to be identical to NaN.
pub trait Identical<T> {
    /// Returns `true` if `first` and `second` may share a run. No guarantees are made about
    /// which of the two values ends up stored in the run.
    fn identical(&self, first: &T, second: &T) -> bool;
}

/// Plain closures and function pointers, e.g. `PartialEq::eq`.
impl<T, F> Identical<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn identical(&self, first: &T, second: &T) -> bool {
        self(first, second)
    }
}
