#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use derive_getters::Dissolve;
use derive_more::Constructor;

/// Settings of the textual `{counts}:{values}` form.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Constructor, Dissolve)]
pub struct Literal {
    // Token printed for NVP (and accepted in addition to `NVP`/`null`)
    pub nvp_token: String,
    // Merge adjacent identical runs instead of rejecting the literal
    pub trim: bool,
}

impl Default for Literal {
    fn default() -> Self {
        Literal {
            nvp_token: "NVP".to_string(),
            trim: true,
        }
    }
}

/// Settings of the parallel aggregation driver.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor, Dissolve)]
pub struct Reduce {
    // Worker threads: positive = exact count, 0 = single thread, -n = all but n - 1 cores
    pub threads: isize,
}

impl Default for Reduce {
    fn default() -> Self {
        Reduce { threads: -1 }
    }
}

#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Constructor, Dissolve)]
pub struct Config {
    pub literal: Literal,
    pub reduce: Reduce,
}
