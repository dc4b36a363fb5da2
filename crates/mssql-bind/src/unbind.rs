//! Decoding of output buffers back into values.
//!
//! The value family recorded at bind time picks the decoder; the storage
//! kind picks the layout. Only the first element is read.

use bytes::Bytes;
use mssql_types::{
    ParamValue, SqlDateStruct, SqlNumericStruct, SqlTimeStruct, SqlTimestampOffsetStruct,
    SqlTimestampStruct, TypeError, decode_utf16_string, from_date_struct, from_time_struct,
    from_timestamp_offset_struct, from_timestamp_struct, numeric_to_f64,
};

use crate::arena::{ArenaElement, ArenaKind};
use crate::binding::Binding;
use crate::error::BindError;
use crate::sql_type::DynamicKind;

fn mismatch(binding: &Binding) -> BindError {
    BindError::Decode(TypeError::TypeMismatch {
        expected: kind_name(binding.descriptor().kind),
        actual: format!("{:?} storage", binding.buffer().kind()),
    })
}

fn kind_name(kind: DynamicKind) -> &'static str {
    match kind {
        DynamicKind::Null => "null",
        DynamicKind::String => "string",
        DynamicKind::Boolean => "boolean",
        DynamicKind::Int32 => "int32",
        DynamicKind::Uint32 => "uint32",
        DynamicKind::Number => "number",
        DynamicKind::Date => "date",
        DynamicKind::Buffer => "buffer",
    }
}

fn first<T: ArenaElement>(binding: &Binding) -> Result<T, BindError> {
    binding
        .buffer()
        .get::<T>()
        .and_then(|elements| elements.first().copied())
        .ok_or_else(|| mismatch(binding))
}

/// Byte length reported by the first indicator, if it fits `max`.
fn reported_len(binding: &Binding, max: usize) -> Option<usize> {
    binding
        .indicator()
        .first()
        .and_then(|&ind| usize::try_from(ind).ok())
        .filter(|&len| len <= max)
}

fn unbind_string(binding: &Binding) -> Result<ParamValue, BindError> {
    let stride = binding.descriptor().stride;
    match binding.buffer().kind() {
        ArenaKind::Wide => {
            let units = binding.buffer().get::<u16>().unwrap_or_default();
            let slot = &units[..(stride / 2).min(units.len())];
            let text = match reported_len(binding, slot.len() * 2) {
                Some(bytes) => String::from_utf16(&slot[..bytes / 2])
                    .map_err(|e| BindError::Decode(TypeError::InvalidEncoding(e.to_string())))?,
                None => decode_utf16_string(slot).map_err(BindError::Decode)?,
            };
            Ok(ParamValue::String(text))
        }
        ArenaKind::Bytes => {
            let bytes = binding.buffer().get::<u8>().unwrap_or_default();
            let slot = &bytes[..stride.min(bytes.len())];
            let end = reported_len(binding, slot.len())
                .unwrap_or_else(|| slot.iter().position(|&b| b == 0).unwrap_or(slot.len()));
            let text = std::str::from_utf8(&slot[..end])
                .map_err(|e| BindError::Decode(TypeError::InvalidEncoding(e.to_string())))?;
            Ok(ParamValue::String(text.to_owned()))
        }
        _ => Err(mismatch(binding)),
    }
}

fn unbind_number(binding: &Binding) -> Result<ParamValue, BindError> {
    let value = match binding.buffer().kind() {
        ArenaKind::Double => first::<f64>(binding)?,
        ArenaKind::Int64 => first::<i64>(binding)? as f64,
        ArenaKind::Numeric => {
            numeric_to_f64(&first::<SqlNumericStruct>(binding)?).map_err(BindError::Decode)?
        }
        _ => return Err(mismatch(binding)),
    };
    Ok(ParamValue::Number(value))
}

fn unbind_date(binding: &Binding) -> Result<ParamValue, BindError> {
    let instant = match binding.buffer().kind() {
        ArenaKind::TimestampOffset => {
            from_timestamp_offset_struct(&first::<SqlTimestampOffsetStruct>(binding)?)
        }
        ArenaKind::Timestamp => from_timestamp_struct(&first::<SqlTimestampStruct>(binding)?),
        ArenaKind::Time => from_time_struct(&first::<SqlTimeStruct>(binding)?),
        ArenaKind::Date => from_date_struct(&first::<SqlDateStruct>(binding)?),
        _ => return Err(mismatch(binding)),
    };
    match instant {
        Ok(instant) => Ok(ParamValue::Date(instant)),
        // A NULL output leaves the zeroed struct behind, which is no valid date.
        Err(_) if binding.indicator().first().is_some_and(|&ind| ind < 0) => Ok(ParamValue::Null),
        Err(e) => Err(BindError::Decode(e)),
    }
}

fn unbind_buffer(binding: &Binding) -> Result<ParamValue, BindError> {
    let bytes = binding.buffer().get::<u8>().ok_or_else(|| mismatch(binding))?;
    let stride = binding.descriptor().stride.min(bytes.len());
    match binding.indicator().first() {
        Some(&ind) if ind < 0 => Ok(ParamValue::Null),
        _ => {
            let len = reported_len(binding, stride).unwrap_or(stride);
            Ok(ParamValue::Buffer(Bytes::copy_from_slice(&bytes[..len])))
        }
    }
}

/// Decode the first element of a binding into a value.
///
/// The indicator supplies text and binary lengths. A NULL indicator on a
/// fixed-width output still decodes the buffer contents; only binary
/// buffers and undecodable temporal structs read it as NULL.
pub fn unbind(binding: &Binding) -> Result<ParamValue, BindError> {
    if binding.buffer().is_empty() {
        return Ok(ParamValue::Null);
    }
    match binding.descriptor().kind {
        DynamicKind::Null => Ok(ParamValue::Null),
        DynamicKind::String => unbind_string(binding),
        DynamicKind::Boolean => Ok(ParamValue::Bool(first::<u8>(binding)? != 0)),
        DynamicKind::Int32 => Ok(ParamValue::Int32(first::<i32>(binding)?)),
        DynamicKind::Uint32 => Ok(ParamValue::Uint32(first::<u32>(binding)?)),
        DynamicKind::Number => unbind_number(binding),
        DynamicKind::Date => unbind_date(binding),
        DynamicKind::Buffer => unbind_buffer(binding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BindConfig, BindContext};
    use crate::reserve::reserve_column;
    use crate::scalar;
    use crate::sql_type::SqlDataType;

    #[test]
    fn test_unbind_wide_string() {
        let config = BindConfig::default();
        let binding = scalar::bind_wide_string(&"héllo".into(), &BindContext::new(&config)).unwrap();
        assert_eq!(unbind(&binding).unwrap(), ParamValue::String("héllo".into()));
    }

    #[test]
    fn test_unbind_column_text_written_by_driver() {
        let config = BindConfig::default();
        let mut binding = reserve_column(SqlDataType::WVarChar.code(), 4, &config).unwrap();
        binding.buffer_mut().get_mut::<u16>().unwrap()[..2].copy_from_slice(&[0x6F, 0x6B]);
        binding.indicator_mut()[0] = 4;
        assert_eq!(unbind(&binding).unwrap(), ParamValue::String("ok".into()));

        // No usable length: read up to the terminator.
        binding.indicator_mut()[0] = -4;
        assert_eq!(unbind(&binding).unwrap(), ParamValue::String("ok".into()));
    }

    #[test]
    fn test_unbind_narrow_string() {
        let config = BindConfig::default();
        let binding =
            scalar::bind_narrow_string(&"abc".into(), &BindContext::new(&config)).unwrap();
        assert_eq!(unbind(&binding).unwrap(), ParamValue::String("abc".into()));
    }

    #[test]
    fn test_unbind_fixed_width() {
        assert_eq!(
            unbind(&scalar::bind_bool(&true.into()).unwrap()).unwrap(),
            ParamValue::Bool(true)
        );
        assert_eq!(
            unbind(&scalar::bind_u32(&7u32.into()).unwrap()).unwrap(),
            ParamValue::Uint32(7)
        );
        assert_eq!(
            unbind(&scalar::bind_i64(&42.0.into()).unwrap()).unwrap(),
            ParamValue::Number(42.0)
        );
    }

    #[test]
    fn test_unbind_numeric() {
        let config = BindConfig::default();
        let binding = scalar::bind_numeric(&(-12.5).into(), &BindContext::new(&config)).unwrap();
        assert_eq!(unbind(&binding).unwrap(), ParamValue::Number(-12.5));
    }

    #[test]
    fn test_unbind_null_binding() {
        assert_eq!(unbind(&scalar::bind_null()).unwrap(), ParamValue::Null);
    }

    #[test]
    fn test_unbind_null_buffer() {
        let config = BindConfig::default();
        let binding = scalar::bind_binary(&ParamValue::Null, &BindContext::new(&config)).unwrap();
        assert_eq!(unbind(&binding).unwrap(), ParamValue::Null);
    }

    #[test]
    fn test_unbind_null_date() {
        let config = BindConfig::default();
        let ctx = BindContext::new(&config);
        let binding = scalar::bind_timestamp(&ParamValue::Null, &ctx).unwrap();
        assert_eq!(unbind(&binding).unwrap(), ParamValue::Null);

        let epoch = ParamValue::date_from_millis(0).unwrap();
        let binding = scalar::bind_timestamp_offset(&epoch, &ctx).unwrap();
        assert_eq!(unbind(&binding).unwrap(), epoch);
    }

    #[test]
    fn test_kind_storage_mismatch() {
        let mut binding = scalar::bind_bool(&true.into()).unwrap();
        binding.descriptor_mut().kind = DynamicKind::Date;
        assert!(matches!(unbind(&binding), Err(BindError::Decode(_))));
    }
}
