//! Binding error types.

use mssql_types::TypeError;
use thiserror::Error;

/// Errors that can occur while binding or unbinding parameters.
///
/// A binding failure never touches buffers of parameters bound earlier, but
/// a parameter set carrying one must not be handed to the driver.
#[derive(Debug, Error)]
pub enum BindError {
    /// Value shape unrecognized, or explicit SQL type code unknown.
    #[error("invalid parameter type: {0}")]
    InvalidParameterType(String),

    /// NaN, infinity, or a number outside representable bounds.
    #[error("invalid number parameter: {0}")]
    InvalidNumberValue(String),

    /// Failure of one parameter within a set.
    #[error("parameter {index}: {source}")]
    Parameter {
        /// 0-based parameter index.
        index: usize,
        /// Underlying failure.
        #[source]
        source: Box<BindError>,
    },

    /// The parameter set already failed and cannot be used.
    #[error("parameter set unusable, parameter {index} failed: {reason}")]
    Rejected {
        /// 0-based index of the parameter that failed.
        index: usize,
        /// Message of the original failure.
        reason: String,
    },

    /// Too many parameters for the driver's 16-bit parameter numbers.
    #[error("too many parameters: {0}")]
    TooManyParameters(usize),

    /// Output buffer could not be decoded.
    #[error("decode failed: {0}")]
    Decode(#[source] TypeError),

    /// The native driver rejected the call.
    #[error("native driver error: {0}")]
    Native(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BindError {
    /// Whether this is (or wraps) an `InvalidNumberValue` failure.
    #[must_use]
    pub fn is_number_error(&self) -> bool {
        match self {
            Self::InvalidNumberValue(_) => true,
            Self::Parameter { source, .. } => source.is_number_error(),
            _ => false,
        }
    }

    /// Whether this is (or wraps) an `InvalidParameterType` failure.
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::InvalidParameterType(_) => true,
            Self::Parameter { source, .. } => source.is_type_error(),
            _ => false,
        }
    }
}

impl From<TypeError> for BindError {
    fn from(e: TypeError) -> Self {
        if e.is_number_error() {
            Self::InvalidNumberValue(e.to_string())
        } else {
            Self::InvalidParameterType(e.to_string())
        }
    }
}
