use std::fmt::Debug;

use eyre::{eyre, Result};

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are non-negative primitive integers. Run lengths are stored as PrimUInt and
/// widened to u64 whenever positions are accumulated.
pub trait PrimUInt: PrimInt + ::num::Unsigned {
    /// Widen the value to u64. Lossless for every unsigned type up to 64 bits.
    #[inline(always)]
    fn widen(self) -> u64 {
        // u128 lengths beyond u64::MAX are not representable as positions anyway
        self.to_u64().unwrap_or(u64::MAX)
    }

    /// Narrow a u64 back into the storage type, failing if it doesn't fit.
    #[inline]
    fn narrow(value: u64) -> Result<Self> {
        <Self as ::num::NumCast>::from(value)
            .ok_or_else(|| eyre!("Length {} can't fit in {:?}", value, Self::max_value()))
    }
}

impl<T: PrimInt + ::num::Unsigned> PrimUInt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_and_widen() -> Result<()> {
        assert_eq!(u8::narrow(255)?, 255u8);
        assert!(u8::narrow(256).is_err());
        assert_eq!(u32::narrow(7)?.widen(), 7);
        assert_eq!(u64::MAX.widen(), u64::MAX);
        Ok(())
    }
}
