//! Dynamic parameter value representation.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A dynamically typed value supplied for one SQL parameter.
///
/// Every shape a caller may hand to the binder has exactly one variant, so
/// classification is an exhaustive match rather than a chain of runtime
/// type checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamValue {
    /// NULL value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit unsigned integer.
    Uint32(u32),
    /// Generic floating point number.
    Number(f64),
    /// Text value.
    String(String),
    /// Point in time, always held in UTC.
    Date(DateTime<Utc>),
    /// Byte sequence.
    Buffer(Bytes),
    /// Flat array of scalar values.
    Array(Vec<ParamValue>),
    /// Value wrapped in an explicit binding directive.
    Directive(Box<Directive>),
    /// Table-valued parameter.
    Tvp(TvpParam),
}

/// Explicit binding instructions wrapped around a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Stored procedure parameter, possibly an output.
    Procedure(ProcedureParam),
    /// Value bound against an explicit SQL type code.
    Typed(TypedParam),
}

/// A stored procedure parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParam {
    /// Whether the parameter is an output parameter.
    pub is_output: bool,
    /// Declared SQL type name of the parameter (e.g. `int`, `varchar`).
    pub type_name: String,
    /// Maximum length used when reserving output storage.
    pub max_length: usize,
    /// Input value; ignored for outputs.
    pub value: ParamValue,
}

impl ProcedureParam {
    /// Create an input procedure parameter.
    pub fn input(type_name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            is_output: false,
            type_name: type_name.into(),
            max_length: 0,
            value: value.into(),
        }
    }

    /// Create an output procedure parameter with reserved storage.
    pub fn output(type_name: impl Into<String>, max_length: usize) -> Self {
        Self {
            is_output: true,
            type_name: type_name.into(),
            max_length,
            value: ParamValue::Null,
        }
    }
}

/// A value bound against an explicit SQL type code.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    /// ODBC SQL type code.
    pub sql_type: i16,
    /// Precision or maximum length override.
    pub precision: Option<u64>,
    /// Scale override.
    pub scale: Option<i16>,
    /// UTC offset in minutes for timestamp-with-offset values.
    pub offset_minutes: Option<i32>,
    /// The value to bind.
    pub value: ParamValue,
}

impl TypedParam {
    /// Create a typed parameter with no overrides.
    pub fn new(sql_type: i16, value: impl Into<ParamValue>) -> Self {
        Self {
            sql_type,
            precision: None,
            scale: None,
            offset_minutes: None,
            value: value.into(),
        }
    }

    /// Set the precision override.
    #[must_use]
    pub fn precision(mut self, precision: u64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the scale override.
    #[must_use]
    pub fn scale(mut self, scale: i16) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the UTC offset in minutes.
    #[must_use]
    pub fn offset_minutes(mut self, offset: i32) -> Self {
        self.offset_minutes = Some(offset);
        self
    }
}

/// Table-valued parameter descriptor input.
#[derive(Debug, Clone, PartialEq)]
pub struct TvpParam {
    /// User-defined table type name.
    pub type_name: String,
    /// Schema owning the table type.
    pub schema: Option<String>,
    /// Maximum number of rows the driver should expect.
    pub row_count: u32,
}

impl TvpParam {
    /// Create a TVP descriptor for a single row.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            schema: None,
            row_count: 1,
        }
    }

    /// Set the owning schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the row count.
    #[must_use]
    pub fn row_count(mut self, rows: u32) -> Self {
        self.row_count = rows;
        self
    }
}

impl ParamValue {
    /// Check if the value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Create a date value from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the instant is outside the representable range.
    #[must_use]
    pub fn date_from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::Date)
    }

    /// Wrap a value in a procedure parameter directive.
    #[must_use]
    pub fn procedure(param: ProcedureParam) -> Self {
        Self::Directive(Box::new(Directive::Procedure(param)))
    }

    /// Wrap a value in an explicit SQL type directive.
    #[must_use]
    pub fn typed(param: TypedParam) -> Self {
        Self::Directive(Box::new(Directive::Typed(param)))
    }

    /// Get the value as a bool, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an f64, if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Int32(v) => Some(f64::from(*v)),
            Self::Uint32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as bytes, if it is a buffer.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value family name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int32(_) => "int32",
            Self::Uint32(_) => "uint32",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Buffer(_) => "buffer",
            Self::Array(_) => "array",
            Self::Directive(_) => "object",
            Self::Tvp(_) => "table",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Bytes> for ParamValue {
    fn from(v: Bytes) -> Self {
        Self::Buffer(v)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<TvpParam> for ParamValue {
    fn from(v: TvpParam) -> Self {
        Self::Tvp(v)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        Self::Array(v)
    }
}

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
