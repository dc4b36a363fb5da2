//! Type resolution for dynamic values.

use mssql_types::ParamValue;

use crate::array::bind_array;
use crate::binding::Binding;
use crate::config::{BindConfig, BindContext};
use crate::directive::bind_directive;
use crate::error::BindError;
use crate::scalar;
use crate::tvp::bind_tvp;

// 2^63; the largest double below it is the last integral value in i64 range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Whether a finite number binds as `BIGINT` rather than `DOUBLE`.
fn is_bigint(v: f64) -> bool {
    v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v)
}

/// Pick an encoder for `value` and run it.
///
/// Table-valued parameters come first, then arrays, then directives; any
/// other value is a scalar whose SQL type is inferred from its variant.
pub fn bind_value(value: &ParamValue, config: &BindConfig) -> Result<Binding, BindError> {
    let ctx = BindContext::new(config);
    let binding = match value {
        ParamValue::Tvp(tvp) => Ok(bind_tvp(tvp)),
        ParamValue::Array(items) => bind_array(items, &ctx),
        ParamValue::Directive(directive) => bind_directive(directive, config),
        ParamValue::Null => Ok(scalar::bind_null()),
        ParamValue::String(_) => scalar::bind_wide_string(value, &ctx),
        ParamValue::Bool(_) => scalar::bind_bool(value),
        ParamValue::Int32(_) => scalar::bind_i32(value),
        ParamValue::Uint32(_) => scalar::bind_u32(value),
        ParamValue::Number(v) if !v.is_finite() => Err(BindError::InvalidNumberValue(format!(
            "{v} cannot be bound"
        ))),
        ParamValue::Number(v) if is_bigint(*v) => scalar::bind_i64(value),
        ParamValue::Number(_) => scalar::bind_f64(value),
        ParamValue::Date(_) => scalar::bind_timestamp_offset(value, &ctx),
        ParamValue::Buffer(_) => scalar::bind_binary(value, &ctx),
    }?;

    let desc = binding.descriptor();
    tracing::trace!(
        value = value.type_name(),
        c_type = ?desc.c_type,
        sql_type = ?desc.sql_type,
        elements = binding.element_count(),
        "bound parameter"
    );
    Ok(binding)
}
