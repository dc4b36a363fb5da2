//! Host-style coercions between value families.
//!
//! When an array or an explicit SQL type forces a value into another family
//! (a number bound as text, a string bound as a bit), these rules decide the
//! converted value. They follow the usual dynamic-language semantics:
//! integers wrap modulo 2^32, truthiness for booleans, decimal text for
//! numbers. Shapes with no sensible conversion are errors rather than
//! silent zeros.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TypeError;
use crate::value::ParamValue;

const TWO_POW_32: f64 = 4_294_967_296.0;

fn unsupported(value: &ParamValue, to: &'static str) -> TypeError {
    TypeError::UnsupportedConversion {
        from: value.type_name().to_string(),
        to,
    }
}

fn finite(v: f64) -> Result<f64, TypeError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TypeError::InvalidNumber(v))
    }
}

fn wrap_u32(v: f64) -> u32 {
    v.trunc().rem_euclid(TWO_POW_32) as u32
}

/// Render a float the way a dynamic host prints numbers.
#[must_use]
pub fn number_to_string(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else {
        v.to_string()
    }
}

impl ParamValue {
    /// Truthiness of the value.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(v) => *v,
            Self::Int32(v) => *v != 0,
            Self::Uint32(v) => *v != 0,
            Self::Number(v) => *v != 0.0 && !v.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Date(_)
            | Self::Buffer(_)
            | Self::Array(_)
            | Self::Directive(_)
            | Self::Tvp(_) => true,
        }
    }

    /// Numeric value of the value.
    ///
    /// Text is parsed after trimming whitespace; empty text is zero. Dates
    /// become milliseconds since the Unix epoch.
    pub fn to_f64(&self) -> Result<f64, TypeError> {
        match self {
            Self::Null => Ok(0.0),
            Self::Bool(v) => Ok(f64::from(u8::from(*v))),
            Self::Int32(v) => Ok(f64::from(*v)),
            Self::Uint32(v) => Ok(f64::from(*v)),
            Self::Number(v) => finite(*v),
            Self::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                let v = trimmed.parse::<f64>().map_err(|_| TypeError::TypeMismatch {
                    expected: "numeric text",
                    actual: s.clone(),
                })?;
                finite(v)
            }
            Self::Date(d) => Ok(d.timestamp_millis() as f64),
            _ => Err(unsupported(self, "number")),
        }
    }

    /// Value as a signed 32-bit integer, wrapping modulo 2^32.
    pub fn to_i32(&self) -> Result<i32, TypeError> {
        match self {
            Self::Int32(v) => Ok(*v),
            Self::Uint32(v) => Ok(*v as i32),
            _ => Ok(wrap_u32(self.to_f64()?) as i32),
        }
    }

    /// Value as an unsigned 32-bit integer, wrapping modulo 2^32.
    pub fn to_u32(&self) -> Result<u32, TypeError> {
        match self {
            Self::Int32(v) => Ok(*v as u32),
            Self::Uint32(v) => Ok(*v),
            _ => Ok(wrap_u32(self.to_f64()?)),
        }
    }

    /// Value as a signed 64-bit integer, truncating any fraction.
    pub fn to_i64(&self) -> Result<i64, TypeError> {
        match self {
            Self::Int32(v) => Ok(i64::from(*v)),
            Self::Uint32(v) => Ok(i64::from(*v)),
            _ => {
                let v = self.to_f64()?.trunc();
                // i64::MAX as f64 rounds up to 2^63, which is out of range.
                if v >= -9_223_372_036_854_775_808.0 && v < 9_223_372_036_854_775_808.0 {
                    Ok(v as i64)
                } else {
                    Err(TypeError::OutOfRange { target_type: "i64" })
                }
            }
        }
    }

    /// Textual rendering of the value.
    pub fn to_text(&self) -> Result<String, TypeError> {
        match self {
            Self::Null => Ok("null".to_string()),
            Self::Bool(v) => Ok(v.to_string()),
            Self::Int32(v) => Ok(v.to_string()),
            Self::Uint32(v) => Ok(v.to_string()),
            Self::Number(v) => Ok(number_to_string(*v)),
            Self::String(s) => Ok(s.clone()),
            Self::Date(d) => Ok(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Buffer(b) => Ok(String::from_utf8_lossy(b).into_owned()),
            Self::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| match item {
                        Self::Null => Ok(String::new()),
                        other => other.to_text(),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(","))
            }
            Self::Directive(_) | Self::Tvp(_) => Err(unsupported(self, "string")),
        }
    }

    /// Value as an instant; numbers are milliseconds since the Unix epoch.
    pub fn to_instant(&self) -> Result<DateTime<Utc>, TypeError> {
        match self {
            Self::Date(d) => Ok(*d),
            Self::Int32(_) | Self::Uint32(_) | Self::Number(_) => {
                let millis = self.to_i64()?;
                DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| TypeError::InvalidDateTime(format!("{millis}ms since epoch")))
            }
            _ => Err(unsupported(self, "date")),
        }
    }

    /// Value as raw bytes; only buffers qualify.
    pub fn to_byte_slice(&self) -> Result<&[u8], TypeError> {
        match self {
            Self::Buffer(b) => Ok(b),
            _ => Err(unsupported(self, "buffer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_truthiness() {
        assert!(!ParamValue::Null.to_bool());
        assert!(!ParamValue::Number(f64::NAN).to_bool());
        assert!(!ParamValue::String(String::new()).to_bool());
        assert!(ParamValue::String("false".into()).to_bool());
        assert!(ParamValue::Int32(-1).to_bool());
    }

    #[test]
    fn test_i32_wraps() {
        assert_eq!(ParamValue::Number(4_294_967_297.0).to_i32().unwrap(), 1);
        assert_eq!(ParamValue::Number(-1.9).to_i32().unwrap(), -1);
        assert_eq!(ParamValue::Uint32(u32::MAX).to_i32().unwrap(), -1);
        assert_eq!(ParamValue::Int32(-1).to_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn test_non_finite_is_number_error() {
        let err = ParamValue::Number(f64::INFINITY).to_i32().unwrap_err();
        assert!(err.is_number_error());
    }

    #[test]
    fn test_i64_range() {
        assert_eq!(ParamValue::Number(-2.0f64.powi(63)).to_i64().unwrap(), i64::MIN);
        assert!(ParamValue::Number(2.0f64.powi(63)).to_i64().is_err());
    }

    #[test]
    fn test_text_parsing() {
        assert_eq!(ParamValue::String(" 42 ".into()).to_f64().unwrap(), 42.0);
        assert_eq!(ParamValue::String(String::new()).to_f64().unwrap(), 0.0);
        assert!(matches!(
            ParamValue::String("abc".into()).to_f64(),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(ParamValue::Number(1.5).to_text().unwrap(), "1.5");
        assert_eq!(ParamValue::Number(42.0).to_text().unwrap(), "42");
        assert_eq!(ParamValue::Bool(true).to_text().unwrap(), "true");
        let arr = ParamValue::Array(vec![ParamValue::Int32(1), ParamValue::Null, "x".into()]);
        assert_eq!(arr.to_text().unwrap(), "1,,x");
    }

    #[test]
    fn test_to_instant() {
        let d = ParamValue::Number(1000.0).to_instant().unwrap();
        assert_eq!(d.timestamp_millis(), 1000);
        assert!(ParamValue::String("2024".into()).to_instant().is_err());
    }

    #[test]
    fn test_byte_slice() {
        let v = ParamValue::Buffer(Bytes::from_static(b"ab"));
        assert_eq!(v.to_byte_slice().unwrap(), b"ab");
        assert!(ParamValue::Int32(1).to_byte_slice().is_err());
    }
}
