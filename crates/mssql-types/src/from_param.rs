//! Trait for converting decoded parameter values to Rust types.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::TypeError;
use crate::value::ParamValue;

/// Trait for types that can be extracted from a decoded output value.
pub trait FromParam: Sized {
    /// Convert from a parameter value to this type.
    fn from_param(value: &ParamValue) -> Result<Self, TypeError>;

    /// Convert from an optional parameter value.
    ///
    /// Returns `None` if the value is NULL.
    fn from_param_nullable(value: &ParamValue) -> Result<Option<Self>, TypeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_param(value).map(Some)
        }
    }
}

fn mismatch(expected: &'static str, value: &ParamValue) -> TypeError {
    match value {
        ParamValue::Null => TypeError::UnexpectedNull,
        _ => TypeError::TypeMismatch {
            expected,
            actual: value.type_name().to_string(),
        },
    }
}

impl FromParam for bool {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Bool(v) => Ok(*v),
            ParamValue::Int32(v) => Ok(*v != 0),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl FromParam for i32 {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Int32(v) => Ok(*v),
            ParamValue::Uint32(v) => {
                i32::try_from(*v).map_err(|_| TypeError::OutOfRange { target_type: "i32" })
            }
            ParamValue::Number(v) if v.fract() == 0.0 => {
                if *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX) {
                    Ok(*v as i32)
                } else {
                    Err(TypeError::OutOfRange { target_type: "i32" })
                }
            }
            _ => Err(mismatch("i32", value)),
        }
    }
}

impl FromParam for u32 {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Uint32(v) => Ok(*v),
            ParamValue::Int32(v) => {
                u32::try_from(*v).map_err(|_| TypeError::OutOfRange { target_type: "u32" })
            }
            _ => Err(mismatch("u32", value)),
        }
    }
}

impl FromParam for i64 {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Int32(v) => Ok(i64::from(*v)),
            ParamValue::Uint32(v) => Ok(i64::from(*v)),
            ParamValue::Number(_) => value.to_i64(),
            _ => Err(mismatch("i64", value)),
        }
    }
}

impl FromParam for f64 {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        value.as_f64().ok_or_else(|| mismatch("f64", value))
    }
}

impl FromParam for String {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::String(v) => Ok(v.clone()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromParam for Bytes {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Buffer(v) => Ok(v.clone()),
            _ => Err(mismatch("Bytes", value)),
        }
    }
}

impl FromParam for DateTime<Utc> {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        match value {
            ParamValue::Date(v) => Ok(*v),
            _ => Err(mismatch("DateTime<Utc>", value)),
        }
    }
}

impl<T: FromParam> FromParam for Option<T> {
    fn from_param(value: &ParamValue) -> Result<Self, TypeError> {
        T::from_param_nullable(value)
    }
}
