//! Single-value encoders.
//!
//! Fixed-width scalars are one-element arrays and reuse the array encoders.
//! Text, binary and the calendar structs have scalar-only layouts.

use std::mem::size_of;
use std::slice;

use mssql_types::{
    ParamValue, SqlDateStruct, SqlTimeStruct, SqlTimestampStruct, encode_utf16, encode_utf8,
    to_date_struct, to_time_struct, to_timestamp_struct,
};

use crate::arena::PinnedBuffer;
use crate::array::{self, fixed_width};
use crate::binding::{Binding, ParamDescriptor, SQL_NULL_DATA};
use crate::config::BindContext;
use crate::error::BindError;
use crate::sql_type::{CDataType, DynamicKind, SqlDataType};

/// NULL placeholder: `SQL_C_CHAR` / `SQL_CHAR`, no storage.
#[must_use]
pub fn bind_null() -> Binding {
    array::bind_null_array(1)
}

/// `SQL_C_BIT` / `SQL_BIT`.
pub fn bind_bool(value: &ParamValue) -> Result<Binding, BindError> {
    array::bind_bool_array(slice::from_ref(value))
}

/// `SQL_C_SLONG` / `SQL_INTEGER`.
pub fn bind_i32(value: &ParamValue) -> Result<Binding, BindError> {
    array::bind_i32_array(slice::from_ref(value))
}

/// `SQL_C_ULONG` / `SQL_BIGINT`.
pub fn bind_u32(value: &ParamValue) -> Result<Binding, BindError> {
    array::bind_u32_array(slice::from_ref(value))
}

/// `SQL_C_SBIGINT` / `SQL_BIGINT`.
pub fn bind_i64(value: &ParamValue) -> Result<Binding, BindError> {
    array::bind_i64_array(slice::from_ref(value))
}

/// `SQL_C_DOUBLE` / `SQL_DOUBLE`.
pub fn bind_f64(value: &ParamValue) -> Result<Binding, BindError> {
    array::bind_f64_array(slice::from_ref(value))
}

/// `SQL_C_NUMERIC` / `SQL_NUMERIC`.
///
/// The declared precision and scale are those actually encoded.
pub fn bind_numeric(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    array::bind_numeric_array(slice::from_ref(value), ctx)
}

/// `SQL_C_BINARY` / `SQL_SS_TIMESTAMPOFFSET`.
pub fn bind_timestamp_offset(
    value: &ParamValue,
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    array::bind_timestamp_offset_array(slice::from_ref(value), ctx)
}

/// `SQL_C_WCHAR` / `SQL_WVARCHAR`.
///
/// A requested precision caps the length in UTF-16 units. The declared
/// size counts characters, not bytes. Strings longer than the inline limit
/// are declared with size 0 (`nvarchar(max)`).
pub fn bind_wide_string(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    let units = match value {
        ParamValue::Null => None,
        other => Some(encode_utf16(&other.to_text()?, ctx.char_limit())),
    };
    let len = units.as_ref().map_or(0, Vec::len);
    let slot = len.max(1);

    let mut storage = vec![0u16; slot];
    let mut indicator = SQL_NULL_DATA;
    if let Some(units) = &units {
        storage[..len].copy_from_slice(units);
        indicator = (len * size_of::<u16>()) as isize;
    }

    let mut descriptor =
        ParamDescriptor::new(DynamicKind::String, CDataType::WChar, SqlDataType::WVarChar);
    descriptor.stride = slot * size_of::<u16>();
    descriptor.buffer_len = len * size_of::<u16>();
    descriptor.param_size = if len > ctx.config.max_inline_wide_chars {
        0
    } else {
        slot as u64
    };
    Ok(Binding::new(
        descriptor,
        PinnedBuffer::from_vec(storage),
        vec![indicator],
    ))
}

/// `SQL_C_WCHAR` / `SQL_WLONGVARCHAR`, declared at its byte length.
pub fn bind_wide_long_string(
    value: &ParamValue,
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let mut binding = bind_wide_string(value, ctx)?;
    let descriptor = binding.descriptor_mut();
    descriptor.sql_type = SqlDataType::WLongVarChar;
    descriptor.param_size = descriptor.buffer_len as u64;
    Ok(binding)
}

/// `SQL_C_CHAR` / `SQL_VARCHAR`, UTF-8 text.
///
/// A requested precision caps the length in bytes, without splitting a
/// character.
pub fn bind_narrow_string(
    value: &ParamValue,
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let text = match value {
        ParamValue::Null => None,
        other => Some(other.to_text()?),
    };
    let bytes = text.as_deref().map(|t| encode_utf8(t, ctx.char_limit()));
    let len = bytes.map_or(0, <[u8]>::len);
    let slot = len.max(1);

    let mut storage = vec![0u8; slot];
    let mut indicator = SQL_NULL_DATA;
    if let Some(bytes) = bytes {
        storage[..len].copy_from_slice(bytes);
        indicator = len as isize;
    }

    let mut descriptor =
        ParamDescriptor::new(DynamicKind::String, CDataType::Char, SqlDataType::VarChar);
    descriptor.stride = slot;
    descriptor.buffer_len = len;
    descriptor.param_size = slot as u64;
    Ok(Binding::new(
        descriptor,
        PinnedBuffer::from_vec(storage),
        vec![indicator],
    ))
}

/// `SQL_C_BINARY` / `SQL_VARBINARY` (or `SQL_LONGVARBINARY` past the
/// configured threshold).
pub fn bind_binary(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    array::bind_binary_array(slice::from_ref(value), ctx)
}

fn temporal_len<T>() -> isize {
    size_of::<T>() as isize
}

/// `SQL_C_TYPE_DATE` / `SQL_TYPE_DATE`.
///
/// A requested precision replaces the declared size.
pub fn bind_date(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Date, CDataType::TypeDate, SqlDataType::TypeDate);
    descriptor.param_size = ctx
        .precision
        .filter(|&p| p > 0)
        .unwrap_or(ctx.config.datetime_precision);
    descriptor.digits = ctx.config.datetime_scale;
    fixed_width(
        slice::from_ref(value),
        descriptor,
        temporal_len::<SqlDateStruct>(),
        |v| Ok(to_date_struct(v.to_instant()?, 0)?),
    )
}

/// `SQL_C_BINARY` / `SQL_SS_TIME2`.
pub fn bind_time(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Date, CDataType::Binary, SqlDataType::SsTime2);
    descriptor.param_size = ctx.config.time_precision;
    descriptor.digits = ctx.temporal_scale();
    fixed_width(
        slice::from_ref(value),
        descriptor,
        temporal_len::<SqlTimeStruct>(),
        |v| Ok(to_time_struct(v.to_instant()?, 0)?),
    )
}

/// `SQL_C_TYPE_TIMESTAMP` / `SQL_TYPE_TIMESTAMP`.
pub fn bind_timestamp(value: &ParamValue, ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    let mut descriptor = ParamDescriptor::new(
        DynamicKind::Date,
        CDataType::TypeTimestamp,
        SqlDataType::TypeTimestamp,
    );
    descriptor.param_size = ctx.config.timestamp_precision;
    descriptor.digits = ctx.temporal_scale();
    fixed_width(
        slice::from_ref(value),
        descriptor,
        temporal_len::<SqlTimestampStruct>(),
        |v| Ok(to_timestamp_struct(v.to_instant()?, 0)?),
    )
}
