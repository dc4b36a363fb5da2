//! Explicitly typed and stored-procedure parameters.

use mssql_types::{Directive, ParamValue, ProcedureParam, TypedParam};

use crate::array;
use crate::binding::Binding;
use crate::config::{BindConfig, BindContext};
use crate::error::BindError;
use crate::reserve::reserve_output;
use crate::resolve::bind_value;
use crate::scalar;
use crate::sql_type::{ParamDirection, SqlDataType};

/// Bind a value wrapped in a directive.
pub fn bind_directive(directive: &Directive, config: &BindConfig) -> Result<Binding, BindError> {
    match directive {
        Directive::Procedure(param) => bind_procedure(param, config),
        Directive::Typed(param) => bind_typed(param, config),
    }
}

/// Bind a stored procedure parameter.
///
/// Outputs get zeroed storage shaped by the declared type name; inputs bind
/// their value as if it had been passed directly.
pub fn bind_procedure(param: &ProcedureParam, config: &BindConfig) -> Result<Binding, BindError> {
    if param.is_output {
        reserve_output(param, config)
    } else {
        Ok(bind_value(&param.value, config)?.with_direction(ParamDirection::Input))
    }
}

fn with_sql_type(mut binding: Binding, sql_type: SqlDataType) -> Binding {
    binding.descriptor_mut().sql_type = sql_type;
    binding
}

/// Bind a value against an explicit SQL type code.
///
/// Precision, scale and offset overrides apply before dispatch. Arrays of
/// some types reuse a wider encoder: `SMALLINT` arrays are unsigned,
/// `CHAR`/`VARCHAR` arrays are wide text, and every temporal array is
/// `datetimeoffset`.
pub fn bind_typed(param: &TypedParam, config: &BindConfig) -> Result<Binding, BindError> {
    let sql_type = SqlDataType::from_code(param.sql_type).ok_or_else(|| {
        BindError::InvalidParameterType(format!("unknown SQL type code {}", param.sql_type))
    })?;
    let ctx = BindContext {
        config,
        precision: param.precision,
        scale: param.scale,
        offset_minutes: param.offset_minutes.unwrap_or(0),
    };
    tracing::trace!(
        sql_type = ?sql_type,
        precision = ?param.precision,
        scale = ?param.scale,
        "binding explicitly typed parameter"
    );

    match &param.value {
        ParamValue::Array(items) => bind_typed_array(sql_type, items, &ctx),
        value => bind_typed_scalar(sql_type, value, &ctx),
    }
}

fn bind_typed_scalar(
    sql_type: SqlDataType,
    value: &ParamValue,
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    match sql_type {
        SqlDataType::LongVarBinary => Ok(with_sql_type(
            scalar::bind_binary(value, ctx)?,
            SqlDataType::LongVarBinary,
        )),
        SqlDataType::VarBinary => match value {
            ParamValue::Null | ParamValue::Buffer(_) => scalar::bind_binary(value, ctx),
            other => Err(BindError::InvalidParameterType(format!(
                "VARBINARY expects a buffer, got {}",
                other.type_name()
            ))),
        },
        SqlDataType::Integer => scalar::bind_i32(value),
        SqlDataType::WVarChar => scalar::bind_wide_string(value, ctx),
        SqlDataType::WLongVarChar => scalar::bind_wide_long_string(value, ctx),
        SqlDataType::Bit => scalar::bind_bool(value),
        SqlDataType::BigInt => scalar::bind_i64(value),
        SqlDataType::Double => scalar::bind_f64(value),
        SqlDataType::Float | SqlDataType::Real => {
            Ok(with_sql_type(scalar::bind_f64(value)?, sql_type))
        }
        SqlDataType::TinyInt | SqlDataType::SmallInt => {
            Ok(with_sql_type(scalar::bind_i32(value)?, sql_type))
        }
        SqlDataType::Numeric => scalar::bind_numeric(value, ctx),
        SqlDataType::Char | SqlDataType::VarChar => scalar::bind_narrow_string(value, ctx),
        SqlDataType::SsTime2 => scalar::bind_time(value, ctx),
        SqlDataType::TypeDate => scalar::bind_date(value, ctx),
        SqlDataType::TypeTimestamp => scalar::bind_timestamp(value, ctx),
        SqlDataType::SsTimestampOffset => scalar::bind_timestamp_offset(value, ctx),
        other => Err(unsupported(other)),
    }
}

fn bind_typed_array(
    sql_type: SqlDataType,
    items: &[ParamValue],
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    match sql_type {
        SqlDataType::LongVarBinary | SqlDataType::VarBinary => array::bind_binary_array(items, ctx),
        SqlDataType::Integer => array::bind_i32_array(items),
        SqlDataType::WVarChar
        | SqlDataType::WLongVarChar
        | SqlDataType::Char
        | SqlDataType::VarChar => array::bind_wide_string_array(items, ctx),
        SqlDataType::Bit => array::bind_bool_array(items),
        SqlDataType::BigInt => array::bind_i64_array(items),
        SqlDataType::Double => array::bind_f64_array(items),
        SqlDataType::Float | SqlDataType::Real => {
            Ok(with_sql_type(array::bind_f64_array(items)?, sql_type))
        }
        SqlDataType::TinyInt => Ok(with_sql_type(array::bind_i32_array(items)?, sql_type)),
        SqlDataType::SmallInt => Ok(with_sql_type(array::bind_u32_array(items)?, sql_type)),
        SqlDataType::Numeric => array::bind_numeric_array(items, ctx),
        SqlDataType::SsTime2
        | SqlDataType::TypeDate
        | SqlDataType::TypeTimestamp
        | SqlDataType::SsTimestampOffset => array::bind_timestamp_offset_array(items, ctx),
        other => Err(unsupported(other)),
    }
}

fn unsupported(sql_type: SqlDataType) -> BindError {
    BindError::InvalidParameterType(format!(
        "SQL type {sql_type:?} ({}) cannot be bound explicitly",
        sql_type.code()
    ))
}
