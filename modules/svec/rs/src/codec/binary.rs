//! Packed little-endian form:
//!
//! ```text
//! dimension: i64        -1 for a scalar
//! runs:      u64
//! counts:    runs x u64
//! values:    runs x f64 bits, NVP stored as `NVP_BITS`
//! ```
//!
//! A scalar is stored as a single run of length 1.

use std::io::{self, Read, Write};

use eyre::{bail, Report, Result, WrapErr};

use crate::error::Error;
use crate::svec::{SparseVector, Svec};
use crate::value::Value;

/// Quiet NaN payload reserved for NVP. Computed NaNs are written as `f64::NAN` instead.
pub const NVP_BITS: u64 = 0x7FF8_4E56_5000_0000;

const SCALAR_DIMENSION: i64 = -1;
const HEADER_BYTES: usize = 2 * size_of::<u64>();
const RUN_BYTES: usize = 2 * size_of::<u64>();

pub fn size_in_bytes(svec: &Svec) -> usize {
    let runs = match svec {
        Svec::Scalar(_) => 1,
        Svec::Vector(vector) => vector.num_runs(),
    };
    HEADER_BYTES + runs * RUN_BYTES
}

pub fn encode(svec: &Svec) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(size_in_bytes(svec));
    write_to(svec, &mut bytes)?;
    Ok(bytes)
}

/// Write the packed form, returning the number of written bytes.
pub fn write_to(svec: &Svec, mut writer: impl Write) -> Result<usize> {
    let mut written = 0;
    let mut put = |word: u64| -> Result<()> {
        writer
            .write_all(&word.to_le_bytes())
            .wrap_err("Failed to write a packed svec")?;
        written += size_of::<u64>();
        Ok(())
    };

    match svec {
        Svec::Scalar(value) => {
            put(SCALAR_DIMENSION as u64)?;
            put(1)?;
            put(1)?;
            put(value_to_bits(value))?;
        }
        Svec::Vector(vector) => {
            let dimension = i64::try_from(vector.dimension()).map_err(|_| {
                Report::new(Error::malformed(format!(
                    "dimension {} doesn't fit the packed form",
                    vector.dimension()
                )))
            })?;
            put(dimension as u64)?;
            put(vector.num_runs() as u64)?;
            for count in vector.counts() {
                put(count)?;
            }
            for value in vector.values() {
                put(value_to_bits(&value))?;
            }
        }
    }
    Ok(written)
}

/// Decode a buffer that holds exactly one packed svec.
pub fn decode(bytes: &[u8]) -> Result<Svec> {
    if bytes.len() < HEADER_BYTES {
        bail!(Error::malformed(format!(
            "packed svec is truncated: {} bytes",
            bytes.len()
        )));
    }
    let runs = u64::from_le_bytes(bytes[8..16].try_into()?);
    let expected = usize::try_from(runs)
        .ok()
        .and_then(|runs| runs.checked_mul(RUN_BYTES))
        .and_then(|body| body.checked_add(HEADER_BYTES));
    if expected != Some(bytes.len()) {
        bail!(Error::malformed(format!(
            "packed svec with {runs} runs can't occupy {} bytes",
            bytes.len()
        )));
    }
    read_from(bytes)
}

pub fn read_from(mut reader: impl Read) -> Result<Svec> {
    let dimension = read_word(&mut reader)? as i64;
    let runs = read_word(&mut reader)?;

    if dimension == SCALAR_DIMENSION {
        if runs != 1 {
            bail!(Error::malformed(format!(
                "packed scalar must hold exactly one run, got {runs}"
            )));
        }
        let count = read_word(&mut reader)?;
        if count != 1 {
            bail!(Error::malformed(format!(
                "packed scalar must have a run of length 1, got {count}"
            )));
        }
        let value = bits_to_value(read_word(&mut reader)?);
        return Ok(Svec::Scalar(value));
    }
    if dimension < 0 {
        bail!(Error::malformed(format!(
            "invalid packed dimension {dimension}"
        )));
    }

    // Don't trust the header with the allocation size
    let capacity = runs.min(4096) as usize;
    let mut counts = Vec::with_capacity(capacity);
    for _ in 0..runs {
        counts.push(read_word(&mut reader)?);
    }
    let mut values = Vec::with_capacity(capacity);
    for _ in 0..runs {
        values.push(bits_to_value(read_word(&mut reader)?));
    }

    let total = counts
        .iter()
        .try_fold(0u64, |total, count| total.checked_add(*count));
    if total != Some(dimension as u64) {
        bail!(Error::malformed(format!(
            "run counts don't add up to the dimension {dimension}"
        )));
    }

    let vector = SparseVector::from_runs(counts, values, true)?;
    Ok(Svec::Vector(vector))
}

fn read_word(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; size_of::<u64>()];
    reader.read_exact(&mut buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Report::new(Error::malformed("packed svec is truncated")),
        _ => Report::new(err).wrap_err("Failed to read a packed svec"),
    })?;
    Ok(u64::from_le_bytes(buf))
}

fn value_to_bits(value: &Value) -> u64 {
    match value {
        None => NVP_BITS,
        Some(x) if x.is_nan() => f64::NAN.to_bits(),
        Some(x) => x.to_bits(),
    }
}

fn bits_to_value(bits: u64) -> Value {
    if bits == NVP_BITS {
        None
    } else {
        Some(f64::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NVP;

    fn pack(dimension: i64, counts: &[u64], values: &[f64]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((dimension as u64).to_le_bytes());
        bytes.extend((counts.len() as u64).to_le_bytes());
        for count in counts {
            bytes.extend(count.to_le_bytes());
        }
        for value in values {
            bytes.extend(value.to_bits().to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_layout() -> Result<()> {
        let svec: Svec = "{2,1}:{1.5,NVP}".parse()?;
        let bytes = encode(&svec)?;
        assert_eq!(bytes.len(), size_in_bytes(&svec));
        assert_eq!(bytes.len(), 16 + 2 * 16);

        assert_eq!(&bytes[..8], &3i64.to_le_bytes());
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &2u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &1u64.to_le_bytes());
        assert_eq!(&bytes[32..40], &1.5f64.to_bits().to_le_bytes());
        assert_eq!(&bytes[40..48], &NVP_BITS.to_le_bytes());
        Ok(())
    }

    #[test]
    fn test_decode() -> Result<()> {
        for svec in [
            "{1,2,3}:{4,NVP,5}".parse::<Svec>()?,
            "{40000,1}:{0,-3.25}".parse()?,
            Svec::Vector(SparseVector::empty()),
            Svec::scalar(7.0),
            Svec::Scalar(NVP),
        ] {
            let bytes = encode(&svec)?;
            assert_eq!(decode(&bytes)?, svec);

            let mut stream = Vec::new();
            let written = write_to(&svec, &mut stream)?;
            assert_eq!(written, bytes.len());
            assert_eq!(read_from(stream.as_slice())?, svec);
        }
        Ok(())
    }

    #[test]
    fn test_computed_nan_stays_a_number() -> Result<()> {
        let vector = SparseVector::from_dense(&[f64::from_bits(NVP_BITS), 1.0])?;
        let decoded = decode(&encode(&Svec::Vector(vector))?)?;
        let values = decoded.as_vector()?.to_values();
        assert!(matches!(values[0], Some(x) if x.is_nan()));
        assert_eq!(values[1], Some(1.0));
        Ok(())
    }

    #[test]
    fn test_decode_merges_identical_runs() -> Result<()> {
        for (bytes, expected) in [
            (pack(3, &[1, 2], &[1.0, 1.0]), "{3}:{1}"),
            (pack(4, &[1, 1, 2], &[0.0, -0.0, 5.0]), "{2,2}:{0,5}"),
            (pack(3, &[2, 1], &[f64::NAN, f64::NAN]), "{3}:{NaN}"),
        ] {
            let decoded = decode(&bytes)?;
            assert_eq!(decoded.to_string(), expected);
            assert_eq!(decoded.dimension(), Some(bytes_dimension(&bytes)));
        }

        let mut nvp = pack(2, &[1, 1], &[0.0, 0.0]);
        nvp[32..40].copy_from_slice(&NVP_BITS.to_le_bytes());
        nvp[40..48].copy_from_slice(&NVP_BITS.to_le_bytes());
        assert_eq!(decode(&nvp)?.to_string(), "{2}:{NVP}");
        Ok(())
    }

    fn bytes_dimension(bytes: &[u8]) -> u64 {
        u64::from_le_bytes(bytes[..8].try_into().unwrap())
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let valid = pack(3, &[1, 2], &[1.0, 2.0]);
        let mut trailing = valid.clone();
        trailing.push(0);

        for bytes in [
            vec![],
            valid[..12].to_vec(),
            valid[..valid.len() - 1].to_vec(),
            trailing,
            // Zero count
            pack(3, &[0, 3], &[1.0, 2.0]),
            // Counts don't add up to the dimension
            pack(4, &[1, 2], &[1.0, 2.0]),
            // Negative dimension other than the scalar marker
            pack(-2, &[1], &[1.0]),
            // Scalars hold exactly one run of length 1
            pack(-1, &[1, 1], &[1.0, 2.0]),
            pack(-1, &[2], &[1.0]),
        ] {
            let err = decode(&bytes).unwrap_err();
            assert!(
                matches!(Error::find(&err), Some(Error::MalformedEncoding(_))),
                "{bytes:?}: {err}"
            );
        }
    }
}
