//! Zero-valued storage for output parameters and result columns.

use std::mem::size_of;
use std::slice;

use chrono::DateTime;
use mssql_types::{
    ParamValue, ProcedureParam, SqlTimeStruct, SqlTimestampOffsetStruct, SqlTimestampStruct,
};

use crate::arena::{ArenaElement, PinnedBuffer};
use crate::array::fixed_width;
use crate::binding::{Binding, ParamDescriptor, SQL_NULL_DATA};
use crate::config::{BindConfig, BindContext};
use crate::error::BindError;
use crate::scalar;
use crate::sql_type::{CDataType, DynamicKind, ParamDirection, SqlDataType};

/// Storage family an output parameter type name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFamily {
    Int,
    Unsigned,
    Bit,
    Numeric,
    Date,
    String,
    Binary,
}

/// Lowercase a declared type name and drop any `(n)` length suffix.
fn normalize_type_name(type_name: &str) -> String {
    let base = type_name.split('(').next().unwrap_or(type_name);
    base.trim().to_ascii_lowercase()
}

fn output_family(type_name: &str) -> OutputFamily {
    match normalize_type_name(type_name).as_str() {
        "smallint" | "int" | "bigint" | "tinyint" => OutputFamily::Int,
        "sbigint" => OutputFamily::Unsigned,
        "bit" => OutputFamily::Bit,
        "numeric" | "decimal" | "smallmoney" | "money" | "float" | "real" => OutputFamily::Numeric,
        "date" | "datetimeoffset" | "datetime2" | "smalldatetime" | "datetime" | "time" => {
            OutputFamily::Date
        }
        "char" | "text" | "varchar" => OutputFamily::String,
        _ => OutputFamily::Binary,
    }
}

/// Reserve a zero-valued `SQL_PARAM_OUTPUT` binding for a procedure parameter.
///
/// The storage shape follows the declared type name; the parameter's own
/// value is not read.
pub fn reserve_output(param: &ProcedureParam, config: &BindConfig) -> Result<Binding, BindError> {
    let ctx = BindContext::new(config);
    let family = output_family(&param.type_name);
    tracing::trace!(
        type_name = %param.type_name,
        family = ?family,
        max_length = param.max_length,
        "reserving output parameter"
    );

    let binding = match family {
        OutputFamily::Int | OutputFamily::Bit => scalar::bind_i32(&ParamValue::Int32(0))?,
        OutputFamily::Unsigned => scalar::bind_u32(&ParamValue::Uint32(0))?,
        OutputFamily::Numeric => scalar::bind_f64(&ParamValue::Number(0.0))?,
        OutputFamily::Date => {
            scalar::bind_timestamp_offset(&ParamValue::Date(DateTime::default()), &ctx)?
        }
        OutputFamily::String => reserve_wide_text(param.max_length, config, true),
        OutputFamily::Binary => reserve_binary(param.max_length, config, true),
    };
    Ok(binding.with_direction(ParamDirection::Output))
}

/// A zeroed UTF-16 buffer of `chars` units.
///
/// Output parameters start out as a string of that length, so the
/// indicator holds its byte count; result columns start NULL.
fn reserve_wide_text(chars: usize, config: &BindConfig, present: bool) -> Binding {
    let slot = chars.max(1);
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::String, CDataType::WChar, SqlDataType::WVarChar);
    descriptor.stride = slot * size_of::<u16>();
    descriptor.buffer_len = chars * size_of::<u16>();
    descriptor.param_size = if chars > config.max_inline_wide_chars {
        0
    } else {
        slot as u64
    };
    let indicator = if present {
        descriptor.buffer_len as isize
    } else {
        SQL_NULL_DATA
    };
    Binding::new(descriptor, PinnedBuffer::zeroed::<u16>(slot), vec![indicator])
}

/// A zeroed UTF-8 buffer of `len` bytes.
fn reserve_narrow_text(len: usize) -> Binding {
    let slot = len.max(1);
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::String, CDataType::Char, SqlDataType::VarChar);
    descriptor.stride = slot;
    descriptor.buffer_len = len;
    descriptor.param_size = slot as u64;
    Binding::new(descriptor, PinnedBuffer::zeroed::<u8>(slot), vec![SQL_NULL_DATA])
}

/// A zeroed byte buffer of `len` bytes.
fn reserve_binary(len: usize, config: &BindConfig, present: bool) -> Binding {
    let slot = len.max(1);
    let sql_type = if len > config.long_binary_threshold {
        SqlDataType::LongVarBinary
    } else {
        SqlDataType::VarBinary
    };
    let mut descriptor = ParamDescriptor::new(DynamicKind::Buffer, CDataType::Binary, sql_type);
    descriptor.stride = slot;
    descriptor.buffer_len = slot;
    descriptor.param_size = slot as u64;
    let indicator = if present { len as isize } else { SQL_NULL_DATA };
    Binding::new(descriptor, PinnedBuffer::zeroed::<u8>(slot), vec![indicator])
}

/// One zeroed element of `T` with a NULL indicator.
fn reserve_fixed<T: ArenaElement>(descriptor: ParamDescriptor) -> Result<Binding, BindError> {
    fixed_width(slice::from_ref(&ParamValue::Null), descriptor, 0, |_| {
        Ok(T::default())
    })
}

/// C-level integer codes some drivers report in place of SQL types.
const C_INTEGER_CODES: [i16; 6] = [-15, -16, -17, -18, -26, -28];

/// Reserve a single-row buffer for a result column.
///
/// `sql_type` and `len` are the column's type code and size as reported by
/// the driver's column description. Unknown types are read as narrow text.
pub fn reserve_column(
    sql_type: i16,
    len: usize,
    config: &BindConfig,
) -> Result<Binding, BindError> {
    let ctx = BindContext::new(config);
    if C_INTEGER_CODES.contains(&sql_type) {
        return reserve_bigint();
    }

    let Some(ty) = SqlDataType::from_code(sql_type) else {
        return Ok(reserve_narrow_text(len));
    };
    match ty {
        SqlDataType::SsVariant => Ok(reserve_narrow_text(len)),
        SqlDataType::Char
        | SqlDataType::VarChar
        | SqlDataType::LongVarChar
        | SqlDataType::WChar
        | SqlDataType::WVarChar
        | SqlDataType::WLongVarChar
        | SqlDataType::SsXml
        | SqlDataType::Guid => Ok(reserve_wide_text(len.saturating_add(1), config, false)),
        SqlDataType::Bit => {
            let mut descriptor =
                ParamDescriptor::new(DynamicKind::Boolean, CDataType::Bit, SqlDataType::Bit);
            descriptor.param_size = 1;
            reserve_fixed::<u8>(descriptor)
        }
        SqlDataType::SmallInt | SqlDataType::TinyInt | SqlDataType::Integer => reserve_bigint(),
        SqlDataType::Decimal
        | SqlDataType::Numeric
        | SqlDataType::Real
        | SqlDataType::Float
        | SqlDataType::Double
        | SqlDataType::BigInt => {
            let mut descriptor =
                ParamDescriptor::new(DynamicKind::Number, CDataType::Double, SqlDataType::Double);
            descriptor.param_size = size_of::<f64>() as u64;
            reserve_fixed::<f64>(descriptor)
        }
        SqlDataType::Binary
        | SqlDataType::VarBinary
        | SqlDataType::LongVarBinary
        | SqlDataType::SsUdt => Ok(reserve_binary(len, config, false)),
        SqlDataType::SsTimestampOffset => {
            let mut descriptor = ParamDescriptor::new(
                DynamicKind::Date,
                CDataType::Binary,
                SqlDataType::SsTimestampOffset,
            );
            descriptor.param_size = config.datetime_precision;
            descriptor.digits = ctx.temporal_scale();
            reserve_fixed::<SqlTimestampOffsetStruct>(descriptor)
        }
        SqlDataType::TypeTime | SqlDataType::SsTime2 => {
            let mut descriptor =
                ParamDescriptor::new(DynamicKind::Date, CDataType::Binary, SqlDataType::SsTime2);
            descriptor.param_size = config.time_precision;
            descriptor.digits = ctx.temporal_scale();
            reserve_fixed::<SqlTimeStruct>(descriptor)
        }
        SqlDataType::Timestamp
        | SqlDataType::DateTime
        | SqlDataType::TypeTimestamp
        | SqlDataType::TypeDate => {
            let mut descriptor = ParamDescriptor::new(
                DynamicKind::Date,
                CDataType::TypeTimestamp,
                SqlDataType::TypeTimestamp,
            );
            descriptor.param_size = config.timestamp_precision;
            descriptor.digits = ctx.temporal_scale();
            reserve_fixed::<SqlTimestampStruct>(descriptor)
        }
        SqlDataType::SsTable => Ok(reserve_narrow_text(len)),
    }
}

fn reserve_bigint() -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Number, CDataType::SBigInt, SqlDataType::BigInt);
    descriptor.param_size = size_of::<i64>() as u64;
    reserve_fixed::<i64>(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaKind;

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("VARCHAR(50)"), "varchar");
        assert_eq!(normalize_type_name(" Int "), "int");
        assert_eq!(output_family("DateTimeOffset(7)"), OutputFamily::Date);
        assert_eq!(output_family("uniqueidentifier"), OutputFamily::Binary);
    }

    #[test]
    fn test_output_int() {
        let config = BindConfig::default();
        let binding = reserve_output(&ProcedureParam::output("int", 0), &config).unwrap();
        let desc = binding.descriptor();
        assert_eq!(desc.direction, ParamDirection::Output);
        assert_eq!(desc.c_type, CDataType::SLong);
        assert_eq!(binding.buffer().get::<i32>().unwrap(), &[0]);
    }

    #[test]
    fn test_output_families() {
        let config = BindConfig::default();
        let reserve = |name: &str| reserve_output(&ProcedureParam::output(name, 8), &config).unwrap();

        assert_eq!(reserve("sbigint").buffer().kind(), ArenaKind::Uint32);
        assert_eq!(reserve("bit").buffer().kind(), ArenaKind::Int32);
        assert_eq!(reserve("money").buffer().kind(), ArenaKind::Double);
        assert_eq!(reserve("datetime2").buffer().kind(), ArenaKind::TimestampOffset);
        assert_eq!(reserve("varbinary").buffer().kind(), ArenaKind::Bytes);
    }

    #[test]
    fn test_output_string() {
        let config = BindConfig::default();
        let binding = reserve_output(&ProcedureParam::output("varchar", 10), &config).unwrap();
        assert_eq!(binding.buffer().len(), 10);
        assert_eq!(binding.indicator(), &[20]);
        assert_eq!(binding.descriptor().kind, DynamicKind::String);
    }

    #[test]
    fn test_column_text_gets_terminator_slot() {
        let config = BindConfig::default();
        let binding = reserve_column(SqlDataType::WVarChar.code(), 10, &config).unwrap();
        assert_eq!(binding.buffer().len(), 11);
        assert_eq!(binding.indicator(), &[SQL_NULL_DATA]);
    }

    #[test]
    fn test_column_families() {
        let config = BindConfig::default();
        let kind = |ty: SqlDataType| reserve_column(ty.code(), 4, &config).unwrap().buffer().kind();

        assert_eq!(kind(SqlDataType::SsVariant), ArenaKind::Bytes);
        assert_eq!(kind(SqlDataType::Bit), ArenaKind::Bytes);
        assert_eq!(kind(SqlDataType::TinyInt), ArenaKind::Int64);
        assert_eq!(kind(SqlDataType::BigInt), ArenaKind::Double);
        assert_eq!(kind(SqlDataType::SsUdt), ArenaKind::Bytes);
        assert_eq!(kind(SqlDataType::SsTimestampOffset), ArenaKind::TimestampOffset);
        assert_eq!(kind(SqlDataType::TypeTime), ArenaKind::Time);
        assert_eq!(kind(SqlDataType::TypeDate), ArenaKind::Timestamp);
    }

    #[test]
    fn test_column_unknown_code_is_narrow_text() {
        let config = BindConfig::default();
        let binding = reserve_column(-999, 5, &config).unwrap();
        assert_eq!(binding.descriptor().c_type, CDataType::Char);
        assert_eq!(binding.buffer().len(), 5);

        let int = reserve_column(-16, 0, &config).unwrap();
        assert_eq!(int.buffer().kind(), ArenaKind::Int64);
    }
}
