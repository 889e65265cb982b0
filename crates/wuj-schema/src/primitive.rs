//! Fixed-width scalar codec.
//!
//! Every [`Primitive`] has a fixed byte width and both a decode and an encode
//! arm; all multi-byte values are big-endian.

use wuj_common::{ascii_str, BinaryReader};

use crate::{Error, Result, Value};

/// Number of decimal digits decoded floats are rounded to.
pub const FLOAT_DIGITS: usize = 6;

/// A fixed-width scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `n` bytes of padding: decodes to nothing, encodes to zeros.
    Pad(usize),
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Boolean stored in one byte.
    Bool8,
    /// Boolean stored in two bytes.
    Bool16,
    /// IEEE-754 single precision float.
    F32,
    /// Four raw ASCII bytes.
    Tag,
    /// ASCII text null-padded to `n` bytes.
    FixedString(usize),
}

impl Primitive {
    /// Width of the field in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Pad(n) | Self::FixedString(n) => n,
            Self::U8 | Self::Bool8 => 1,
            Self::U16 | Self::Bool16 => 2,
            Self::U32 | Self::F32 | Self::Tag => 4,
        }
    }

    /// Decode the value at `offset`. Padding decodes to `None`.
    pub fn decode(self, data: &[u8], offset: usize) -> Result<Option<Value>> {
        let mut reader = BinaryReader::new_at(data, offset);
        let value = match self {
            Self::Pad(n) => {
                reader.read_bytes(n)?;
                return Ok(None);
            }
            Self::U8 => Value::Int(reader.read_u8()?.into()),
            Self::U16 => Value::Int(reader.read_u16()?.into()),
            Self::U32 => Value::Int(reader.read_u32()?.into()),
            Self::Bool8 => Value::Bool(reader.read_u8()? != 0),
            Self::Bool16 => Value::Bool(reader.read_u16()? != 0),
            Self::F32 => Value::Float(round_float(reader.read_f32()?)),
            Self::Tag => {
                let bytes = reader.read_bytes(4)?;
                Value::String(ascii_str(bytes, offset)?.to_string())
            }
            Self::FixedString(n) => Value::String(reader.read_fixed_string(n)?.to_string()),
        };
        Ok(Some(value))
    }

    /// Encode `value` (or the kind's zero value when absent) onto `out`.
    ///
    /// `field` names the field in error messages.
    pub fn encode(self, field: &str, value: Option<&Value>, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Pad(n) => out.resize(out.len() + n, 0),
            Self::U8 => out.push(integer(field, value, u8::MAX.into())? as u8),
            Self::U16 => {
                let v = integer(field, value, u16::MAX.into())? as u16;
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::U32 => {
                let v = integer(field, value, u32::MAX.into())? as u32;
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Bool8 => out.push(boolean(field, value)? as u8),
            Self::Bool16 => out.extend_from_slice(&(boolean(field, value)? as u16).to_be_bytes()),
            Self::F32 => {
                let v = match value {
                    None => 0.0,
                    Some(v) => v.as_float().ok_or_else(|| mismatch(field, "float", v))?,
                };
                out.extend_from_slice(&(v as f32).to_be_bytes());
            }
            Self::Tag => match value {
                None => out.extend_from_slice(&[0; 4]),
                Some(v) => {
                    let text = v.as_str().ok_or_else(|| mismatch(field, "tag", v))?;
                    if text.len() != 4 || !text.is_ascii() {
                        return Err(wuj_common::Error::InvalidTag(text.to_string()).into());
                    }
                    out.extend_from_slice(text.as_bytes());
                }
            },
            Self::FixedString(n) => {
                let text = string(field, value)?;
                if text.len() > n {
                    return Err(Error::StringTooLong {
                        field: field.to_string(),
                        len: text.len(),
                        max: n,
                    });
                }
                out.extend_from_slice(text.as_bytes());
                out.resize(out.len() + n - text.len(), 0);
            }
        }
        Ok(())
    }
}

/// Round a decoded float to [`FLOAT_DIGITS`] decimal digits.
///
/// Formatting is correctly rounded, so this matches decimal rounding of the
/// exact binary value rather than of a scaled approximation.
pub fn round_float(value: f32) -> f64 {
    if !value.is_finite() {
        return value.into();
    }
    format!("{:.*}", FLOAT_DIGITS, f64::from(value))
        .parse()
        .unwrap_or_else(|_| value.into())
}

fn mismatch(field: &str, expected: &'static str, actual: &Value) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

fn integer(field: &str, value: Option<&Value>, max: u64) -> Result<u64> {
    let v = match value {
        None => 0,
        Some(Value::Int(v)) => *v,
        Some(Value::Bool(v)) => u64::from(*v),
        Some(other) => return Err(mismatch(field, "integer", other)),
    };
    if v > max {
        return Err(Error::IntegerOutOfRange {
            field: field.to_string(),
            value: v,
            max,
        });
    }
    Ok(v)
}

fn boolean(field: &str, value: Option<&Value>) -> Result<bool> {
    match value {
        None => Ok(false),
        Some(Value::Bool(v)) => Ok(*v),
        Some(Value::Int(v)) => Ok(*v != 0),
        Some(other) => Err(mismatch(field, "boolean", other)),
    }
}

/// Resolve a string field for encoding: absent is empty, anything but ASCII
/// without interior nulls is rejected.
pub(crate) fn string<'v>(field: &str, value: Option<&'v Value>) -> Result<&'v str> {
    let text = match value {
        None => return Ok(""),
        Some(v) => v.as_str().ok_or_else(|| mismatch(field, "string", v))?,
    };
    check_ascii(field, text)?;
    Ok(text)
}

/// Reject text that is not ASCII or that contains a null terminator.
pub(crate) fn check_ascii(field: &str, text: &str) -> Result<()> {
    if !text.is_ascii() || text.contains('\0') {
        return Err(Error::InvalidString {
            field: field.to_string(),
            value: text.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(kind: Primitive, value: Option<Value>) -> Vec<u8> {
        let mut out = Vec::new();
        kind.encode("test", value.as_ref(), &mut out).unwrap();
        out
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Primitive::Pad(3).size(), 3);
        assert_eq!(Primitive::Bool16.size(), 2);
        assert_eq!(Primitive::FixedString(16).size(), 16);
        assert_eq!(Primitive::Tag.size(), 4);
    }

    #[test]
    fn test_integers_are_big_endian() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(Primitive::U16.decode(&data, 0).unwrap(), Some(Value::Int(0x1234)));
        assert_eq!(Primitive::U32.decode(&data, 0).unwrap(), Some(Value::Int(0x12345678)));
        assert_eq!(Primitive::U8.decode(&data, 3).unwrap(), Some(Value::Int(0x78)));
        assert_eq!(encoded(Primitive::U32, Some(Value::Int(0x12345678))), data);
    }

    #[test]
    fn test_bool_is_non_zero() {
        assert_eq!(Primitive::Bool16.decode(&[0x01, 0x00], 0).unwrap(), Some(Value::Bool(true)));
        assert_eq!(Primitive::Bool8.decode(&[0x00], 0).unwrap(), Some(Value::Bool(false)));
        assert_eq!(encoded(Primitive::Bool16, Some(Value::Bool(true))), [0x00, 0x01]);
    }

    #[test]
    fn test_float_rounding() {
        let data = 0.1f32.to_be_bytes();
        assert_eq!(Primitive::F32.decode(&data, 0).unwrap(), Some(Value::Float(0.1)));
        assert_eq!(round_float(1.0 / 3.0), 0.333333);
        assert_eq!(encoded(Primitive::F32, Some(Value::Float(0.1))), data);
        assert_eq!(encoded(Primitive::F32, Some(Value::Int(2))), 2.0f32.to_be_bytes());
    }

    #[test]
    fn test_non_finite_floats() {
        let data = f32::INFINITY.to_be_bytes();
        assert_eq!(Primitive::F32.decode(&data, 0).unwrap(), Some(Value::Float(f64::INFINITY)));
        assert_eq!(encoded(Primitive::F32, Some(Value::from("inf"))), data);
        assert_eq!(encoded(Primitive::F32, Some(Value::from("-inf"))), f32::NEG_INFINITY.to_be_bytes());
        assert_eq!(encoded(Primitive::F32, Some(Value::from("NaN"))), f32::NAN.to_be_bytes());

        let mut out = Vec::new();
        assert!(matches!(
            Primitive::F32.encode("speed", Some(&Value::from("fast")), &mut out),
            Err(Error::TypeMismatch { expected: "float", .. })
        ));
    }

    #[test]
    fn test_fixed_string() {
        let data = b"N_root\0\0";
        assert_eq!(
            Primitive::FixedString(8).decode(data, 0).unwrap(),
            Some(Value::String("N_root".into()))
        );
        assert_eq!(encoded(Primitive::FixedString(8), Some(Value::from("N_root"))), data);

        let mut out = Vec::new();
        let too_long = Value::from("much too long");
        assert!(matches!(
            Primitive::FixedString(8).encode("name", Some(&too_long), &mut out),
            Err(Error::StringTooLong { len: 13, max: 8, .. })
        ));
    }

    #[test]
    fn test_tag_is_not_trimmed() {
        let data = b"ab\0\0";
        assert_eq!(
            Primitive::Tag.decode(data, 0).unwrap(),
            Some(Value::String("ab\0\0".into()))
        );
    }

    #[test]
    fn test_padding() {
        assert_eq!(Primitive::Pad(3).decode(&[1, 2, 3], 0).unwrap(), None);
        assert_eq!(encoded(Primitive::Pad(3), Some(Value::Int(9))), [0, 0, 0]);
    }

    #[test]
    fn test_absent_values_encode_as_zero() {
        assert_eq!(encoded(Primitive::U16, None), [0, 0]);
        assert_eq!(encoded(Primitive::F32, None), [0, 0, 0, 0]);
        assert_eq!(encoded(Primitive::FixedString(4), None), [0, 0, 0, 0]);
    }

    #[test]
    fn test_out_of_bounds_is_error() {
        assert!(matches!(
            Primitive::U32.decode(&[0, 0], 0),
            Err(Error::Common(wuj_common::Error::UnexpectedEof { offset: 0, .. }))
        ));
    }

    #[test]
    fn test_encode_range_and_type_checks() {
        let mut out = Vec::new();
        assert!(matches!(
            Primitive::U8.encode("alpha", Some(&Value::Int(256)), &mut out),
            Err(Error::IntegerOutOfRange { value: 256, max: 255, .. })
        ));
        assert!(matches!(
            Primitive::U16.encode("count", Some(&Value::from("x")), &mut out),
            Err(Error::TypeMismatch { expected: "integer", actual: "string", .. })
        ));
    }
}
