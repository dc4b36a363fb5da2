//! # mssql-types
//!
//! Dynamic parameter values and their native ODBC representations.
//!
//! This crate provides the value model a caller hands to the parameter
//! binder, the `#[repr(C)]` structures the SQL Server ODBC driver reads and
//! writes, and the conversions between the two.
//!
//! ## Value Families
//!
//! | Variant | Native shape |
//! |---------|--------------|
//! | `Bool` | `SQL_C_BIT` byte |
//! | `Int32` | `SQL_C_SLONG` |
//! | `Uint32` | `SQL_C_ULONG` |
//! | `Number` | `SQL_C_SBIGINT` or `SQL_C_DOUBLE` |
//! | `String` | UTF-16 `SQL_C_WCHAR` |
//! | `Date` | [`SqlTimestampOffsetStruct`] |
//! | `Buffer` | `SQL_C_BINARY` bytes |
//!
//! Decimal values are encoded as [`SqlNumericStruct`] and calendar values as
//! [`SqlDateStruct`], [`SqlTimeStruct`] or [`SqlTimestampStruct`] when an
//! explicit SQL type asks for them.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod coerce;
pub mod decode;
pub mod encode;
pub mod error;
pub mod from_param;
pub mod native;
pub mod to_param;
pub mod value;

pub use decode::{
    decode_decimal, decode_utf16_string, from_date_struct, from_time_struct,
    from_timestamp_offset_struct, from_timestamp_struct, numeric_to_f64,
};
pub use encode::{
    encode_decimal, encode_utf16, encode_utf8, to_date_struct, to_time_struct,
    to_timestamp_offset_struct, to_timestamp_struct,
};
pub use error::TypeError;
pub use from_param::FromParam;
pub use native::{
    SqlDateStruct, SqlNumericStruct, SqlTimeStruct, SqlTimestampOffsetStruct, SqlTimestampStruct,
};
pub use to_param::ToParam;
pub use value::{Directive, ParamValue, ProcedureParam, TvpParam, TypedParam};
