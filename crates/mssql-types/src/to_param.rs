//! Trait for converting Rust types to parameter values.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::TypeError;
use crate::value::ParamValue;

/// Trait for types that can be converted to parameter values.
///
/// This trait is implemented for common Rust types so callers can build
/// parameter lists without spelling out [`ParamValue`] variants.
pub trait ToParam {
    /// Convert this value to a parameter value.
    fn to_param(&self) -> Result<ParamValue, TypeError>;
}

impl ToParam for bool {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Bool(*self))
    }
}

impl ToParam for i32 {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Int32(*self))
    }
}

impl ToParam for u32 {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Uint32(*self))
    }
}

impl ToParam for i64 {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        // Beyond 2^53 the value would silently lose precision as a float.
        const SAFE: i64 = (1 << 53) - 1;
        if (-SAFE..=SAFE).contains(self) {
            Ok(ParamValue::Number(*self as f64))
        } else {
            Err(TypeError::OutOfRange {
                target_type: "number",
            })
        }
    }
}

impl ToParam for f64 {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Number(*self))
    }
}

impl ToParam for str {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::String(self.to_owned()))
    }
}

impl ToParam for String {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::String(self.clone()))
    }
}

impl ToParam for Bytes {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Buffer(self.clone()))
    }
}

impl ToParam for DateTime<Utc> {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Date(*self))
    }
}

impl ToParam for DateTime<FixedOffset> {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Date(self.to_utc()))
    }
}

impl ToParam for NaiveDateTime {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        Ok(ParamValue::Date(self.and_utc()))
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        match self {
            Some(v) => v.to_param(),
            None => Ok(ParamValue::Null),
        }
    }
}

impl<T: ToParam> ToParam for Vec<T> {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        self.as_slice().to_param()
    }
}

impl<T: ToParam> ToParam for [T] {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        self.iter()
            .map(ToParam::to_param)
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::Array)
    }
}

impl<T: ToParam + ?Sized> ToParam for &T {
    fn to_param(&self) -> Result<ParamValue, TypeError> {
        (*self).to_param()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_param_i32() {
        assert_eq!(42i32.to_param().unwrap(), ParamValue::Int32(42));
    }

    #[test]
    fn test_to_param_i64_is_number() {
        assert_eq!(42i64.to_param().unwrap(), ParamValue::Number(42.0));
        assert!(i64::MAX.to_param().is_err());
    }

    #[test]
    fn test_to_param_option() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.to_param().unwrap(), ParamValue::Int32(42));

        let none: Option<i32> = None;
        assert_eq!(none.to_param().unwrap(), ParamValue::Null);
    }

    #[test]
    fn test_to_param_vec() {
        let v = vec![Some("a"), None];
        assert_eq!(
            v.to_param().unwrap(),
            ParamValue::Array(vec![ParamValue::String("a".into()), ParamValue::Null])
        );
    }
}
