//! Textual form `{c1,c2,...}:{v1,v2,...}`: run counts, then run values.
//!
//! NVP is printed with the configured token (`NVP` by default) and parsed from that token, `NVP`,
//! or `null` (case-insensitive). A bare value without braces denotes a scalar.

use std::fmt;
use std::str::FromStr;

use eyre::{bail, Report, Result};
use itertools::Itertools;

use crate::config;
use crate::error::Error;
use crate::svec::{SparseVector, Svec};
use crate::value::Value;

pub fn parse(text: &str, config: &config::Literal) -> Result<Svec> {
    let text = text.trim();
    if !text.starts_with('{') {
        return Ok(Svec::Scalar(parse_value(text, config)?));
    }

    let Some((counts, values)) = text.split_once(':') else {
        bail!(Error::malformed(format!(
            "expected '{{counts}}:{{values}}', got '{text}'"
        )));
    };

    let counts = list(counts)?
        .into_iter()
        .map(|count| {
            count.parse::<u64>().map_err(|_| {
                Report::new(Error::malformed(format!("invalid run count '{count}'")))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let values = list(values)?
        .into_iter()
        .map(|value| parse_value(value, config))
        .collect::<Result<Vec<_>>>()?;

    if counts.is_empty() || values.is_empty() {
        bail!(Error::malformed("run counts and values can't be empty"));
    }
    let vector = SparseVector::from_runs(counts, values, config.trim)?;
    Ok(Svec::Vector(vector))
}

pub fn format(svec: &Svec, config: &config::Literal) -> String {
    match svec {
        Svec::Scalar(value) => format_value(value, config),
        Svec::Vector(vector) => format_vector(vector, config),
    }
}

fn format_vector(vector: &SparseVector, config: &config::Literal) -> String {
    format!(
        "{{{}}}:{{{}}}",
        vector.counts().join(","),
        vector
            .values()
            .map(|value| format_value(&value, config))
            .join(",")
    )
}

/// Items of a brace-enclosed, comma-separated list.
fn list(part: &str) -> Result<Vec<&str>> {
    let part = part.trim();
    let Some(inner) = part.strip_prefix('{').and_then(|x| x.strip_suffix('}')) else {
        bail!(Error::malformed(format!(
            "expected a brace-enclosed list, got '{part}'"
        )));
    };

    let inner = inner.trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(str::trim).collect())
}

fn parse_value(token: &str, config: &config::Literal) -> Result<Value> {
    if token == config.nvp_token
        || token.eq_ignore_ascii_case("nvp")
        || token.eq_ignore_ascii_case("null")
    {
        return Ok(None);
    }
    match token.parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => bail!(Error::malformed(format!("invalid value '{token}'"))),
    }
}

fn format_value(value: &Value, config: &config::Literal) -> String {
    match value {
        Some(value) => value.to_string(),
        None => config.nvp_token.clone(),
    }
}

impl FromStr for Svec {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self> {
        parse(text, &config::Literal::default())
    }
}

impl fmt::Display for Svec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self, &config::Literal::default()))
    }
}

impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_vector(self, &config::Literal::default()))
    }
}
