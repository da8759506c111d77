use std::fmt;
use std::str::FromStr;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use eyre::{bail, Report, Result};

use crate::error::Error;

/// Named elementwise functions available to `lapply_named`.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Sqrt,
    Abs,
    Ln,
    Log10,
    Exp,
    Floor,
    Ceil,
    Round,
    Sign,
}

impl UnaryFn {
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            UnaryFn::Sqrt => x.sqrt(),
            UnaryFn::Abs => x.abs(),
            UnaryFn::Ln => x.ln(),
            UnaryFn::Log10 => x.log10(),
            UnaryFn::Exp => x.exp(),
            UnaryFn::Floor => x.floor(),
            UnaryFn::Ceil => x.ceil(),
            UnaryFn::Round => x.round(),
            // Zero and NaN map to themselves
            UnaryFn::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    x
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnaryFn::Sqrt => "sqrt",
            UnaryFn::Abs => "abs",
            UnaryFn::Ln => "ln",
            UnaryFn::Log10 => "log10",
            UnaryFn::Exp => "exp",
            UnaryFn::Floor => "floor",
            UnaryFn::Ceil => "ceil",
            UnaryFn::Round => "round",
            UnaryFn::Sign => "sign",
        }
    }
}

impl FromStr for UnaryFn {
    type Err = Report;

    fn from_str(name: &str) -> Result<Self> {
        let function = match name.trim().to_ascii_lowercase().as_str() {
            "sqrt" => UnaryFn::Sqrt,
            "abs" => UnaryFn::Abs,
            "ln" | "log" => UnaryFn::Ln,
            "log10" => UnaryFn::Log10,
            "exp" => UnaryFn::Exp,
            "floor" => UnaryFn::Floor,
            "ceil" | "ceiling" => UnaryFn::Ceil,
            "round" => UnaryFn::Round,
            "sign" | "signum" => UnaryFn::Sign,
            _ => bail!(Error::unsupported(format!("unknown function '{name}'"))),
        };
        Ok(function)
    }
}

impl fmt::Display for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
