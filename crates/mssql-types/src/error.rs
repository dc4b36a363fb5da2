//! Value coercion and native conversion errors.

use thiserror::Error;

/// Errors raised while coercing a value or converting it to or from its
/// native ODBC form.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A NULL reached a conversion that needs a value.
    #[error("unexpected null value")]
    UnexpectedNull,

    /// The value belongs to a family the conversion cannot read.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Family or Rust type the conversion reads.
        expected: &'static str,
        /// What was found instead.
        actual: String,
    },

    /// A number does not fit the integer type it converts to.
    #[error("value out of range for {target_type}")]
    OutOfRange {
        /// Integer type that overflowed.
        target_type: &'static str,
    },

    /// NaN or an infinity where a finite number is needed.
    #[error("invalid number: {0}")]
    InvalidNumber(f64),

    /// UTF-16 or UTF-8 data that does not decode.
    #[error("invalid string encoding: {0}")]
    InvalidEncoding(String),

    /// Calendar fields or an offset that name no representable instant.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// A number with no `SQL_NUMERIC_STRUCT` form, or a struct with no
    /// decimal value.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    /// No coercion exists between the two families.
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Family of the value.
        from: String,
        /// Family asked for.
        to: &'static str,
    },
}

impl TypeError {
    /// Whether the failure came from a numeric value rather than a value shape.
    #[must_use]
    pub fn is_number_error(&self) -> bool {
        matches!(self, Self::InvalidNumber(_) | Self::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_errors() {
        assert!(TypeError::InvalidNumber(f64::NAN).is_number_error());
        assert!(TypeError::OutOfRange { target_type: "i64" }.is_number_error());
        assert!(!TypeError::UnexpectedNull.is_number_error());
        assert!(!TypeError::InvalidDateTime("year 40000".into()).is_number_error());
    }

    #[test]
    fn test_messages() {
        let err = TypeError::UnsupportedConversion {
            from: "array".into(),
            to: "date",
        };
        assert_eq!(err.to_string(), "unsupported conversion from array to date");
        assert_eq!(
            TypeError::InvalidNumber(f64::INFINITY).to_string(),
            "invalid number: inf"
        );
    }
}
