use std::fmt;
use std::str::FromStr;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use eyre::{bail, Report, Result};

use svec_collections_rs::rle_vec::Merge2;

use crate::error::Error;
use crate::value::Value;

/// Elementwise binary operator. NVP on either side yields NVP.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// 1.0 where both sides are equal, 0.0 otherwise.
    Eq,
}

impl Operator {
    #[inline]
    pub fn apply(&self, first: Value, second: Value) -> Value {
        let (a, b) = (first?, second?);
        let result = match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => a / b,
            Operator::Pow => a.powf(b),
            Operator::Eq => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
        };
        Some(result)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Eq => "=",
        }
    }
}

impl Merge2<Value> for Operator {
    #[inline(always)]
    fn two(&mut self, first: &Value, second: &Value) -> Value {
        self.apply(*first, *second)
    }
}

impl FromStr for Operator {
    type Err = Report;

    fn from_str(symbol: &str) -> Result<Self> {
        let op = match symbol.trim() {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "^" | "**" => Operator::Pow,
            "=" => Operator::Eq,
            other => bail!(Error::unsupported(format!("unknown operator '{other}'"))),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NVP;

    #[test]
    fn test_apply() {
        for (op, a, b, expected) in [
            (Operator::Add, Some(1.0), Some(2.0), Some(3.0)),
            (Operator::Sub, Some(1.0), Some(2.0), Some(-1.0)),
            (Operator::Mul, Some(4.0), Some(2.5), Some(10.0)),
            (Operator::Div, Some(1.0), Some(4.0), Some(0.25)),
            (Operator::Div, Some(1.0), Some(0.0), Some(f64::INFINITY)),
            (Operator::Pow, Some(2.0), Some(10.0), Some(1024.0)),
            (Operator::Eq, Some(3.0), Some(3.0), Some(1.0)),
            (Operator::Eq, Some(3.0), Some(4.0), Some(0.0)),
            (Operator::Add, NVP, Some(2.0), NVP),
            (Operator::Mul, Some(0.0), NVP, NVP),
            (Operator::Eq, NVP, NVP, NVP),
        ] {
            assert_eq!(op.apply(a, b), expected, "{a:?} {op} {b:?}");
        }
        assert!(matches!(Operator::Div.apply(Some(0.0), Some(0.0)), Some(x) if x.is_nan()));
    }

    #[test]
    fn test_parse() -> Result<()> {
        for (symbol, expected) in [
            ("+", Operator::Add),
            ("-", Operator::Sub),
            ("*", Operator::Mul),
            (" / ", Operator::Div),
            ("^", Operator::Pow),
            ("**", Operator::Pow),
            ("=", Operator::Eq),
        ] {
            let op: Operator = symbol.parse()?;
            assert_eq!(op, expected);
            assert_eq!(op.to_string().parse::<Operator>()?, op);
        }

        let err = "%".parse::<Operator>().unwrap_err();
        assert!(matches!(Error::find(&err), Some(Error::UnsupportedOperator(_))));
        Ok(())
    }
}
