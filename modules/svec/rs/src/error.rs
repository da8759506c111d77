use derive_more::{Display, Error};

/// Failures reported by the engine.
///
/// Engine functions return `eyre::Result`; the variant below is the root cause of the report and
/// can be recovered with `Error::find` or `Report::downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Two vector operands have different dimensions.
    #[display("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: u64, right: u64 },

    /// A position or a range lies outside the vector.
    #[display("invalid range: {_0}")]
    InvalidRange(#[error(not(source))] String),

    /// Literal or packed binary input can't be decoded.
    #[display("malformed encoding: {_0}")]
    MalformedEncoding(#[error(not(source))] String),

    /// The operation is undefined for the given operands.
    #[display("unsupported operator: {_0}")]
    UnsupportedOperator(#[error(not(source))] String),
}

impl Error {
    /// Typed root cause of an engine report, if there is one.
    pub fn find(report: &eyre::Report) -> Option<&Error> {
        report.chain().find_map(|err| err.downcast_ref::<Error>())
    }

    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        Error::InvalidRange(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedEncoding(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedOperator(message.into())
    }
}

#[cfg(test)]
mod tests {
    use eyre::{bail, Result, WrapErr};

    use super::*;

    fn fails() -> Result<()> {
        bail!(Error::DimensionMismatch { left: 3, right: 4 })
    }

    #[test]
    fn test_error_survives_context() {
        let report = fails().wrap_err("while adding vectors").unwrap_err();
        assert_eq!(
            Error::find(&report),
            Some(&Error::DimensionMismatch { left: 3, right: 4 })
        );
        assert_eq!(
            Error::malformed("empty counts").to_string(),
            "malformed encoding: empty counts"
        );
    }
}
