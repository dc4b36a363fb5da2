//! Homogeneous array encoders.
//!
//! Every element of an array shares one stride. Fixed-width families use
//! the native element width; text and binary use the widest non-NULL
//! element, with shorter elements left-aligned in zeroed slots. NULL
//! elements keep a zeroed slot and a [`SQL_NULL_DATA`] indicator.
//!
//! Elements that belong to another value family are coerced first (see
//! `mssql_types::coerce`); a coercion that cannot be expressed fails the
//! whole array.

use std::mem::size_of;

use mssql_types::encode::MAX_NUMERIC_PRECISION;
use mssql_types::{
    ParamValue, SqlNumericStruct, SqlTimestampOffsetStruct, encode_decimal, encode_utf16,
    to_timestamp_offset_struct,
};

use crate::arena::{ArenaElement, PinnedBuffer};
use crate::binding::{Binding, ParamDescriptor, SQL_NULL_DATA};
use crate::config::BindContext;
use crate::error::BindError;
use crate::sql_type::{CDataType, DynamicKind, SqlDataType};

/// Encode fixed-width elements, one native `T` per item.
///
/// Present elements get `present_len` as their indicator.
pub(crate) fn fixed_width<T: ArenaElement>(
    items: &[ParamValue],
    mut descriptor: ParamDescriptor,
    present_len: isize,
    mut encode: impl FnMut(&ParamValue) -> Result<T, BindError>,
) -> Result<Binding, BindError> {
    let mut indicator = vec![SQL_NULL_DATA; items.len()];
    let mut elements = Vec::with_capacity(items.len());
    for (item, ind) in items.iter().zip(indicator.iter_mut()) {
        if item.is_null() {
            elements.push(T::default());
        } else {
            elements.push(encode(item)?);
            *ind = present_len;
        }
    }

    descriptor.stride = size_of::<T>();
    descriptor.buffer_len = descriptor.stride * items.len();
    Ok(Binding::new(
        descriptor,
        PinnedBuffer::from_vec(elements),
        indicator,
    ))
}

fn struct_len<T>() -> isize {
    size_of::<T>() as isize
}

/// An all-NULL array: no storage, every indicator NULL.
#[must_use]
pub fn bind_null_array(len: usize) -> Binding {
    let mut descriptor = ParamDescriptor::new(DynamicKind::Null, CDataType::Char, SqlDataType::Char);
    descriptor.param_size = 1;
    Binding::new(descriptor, PinnedBuffer::empty(), vec![SQL_NULL_DATA; len])
}

/// `SQL_C_BIT` / `SQL_BIT`, one byte per element.
pub fn bind_bool_array(items: &[ParamValue]) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Boolean, CDataType::Bit, SqlDataType::Bit);
    descriptor.param_size = size_of::<u8>() as u64;
    fixed_width(items, descriptor, 0, |v| Ok(u8::from(v.to_bool())))
}

/// `SQL_C_SLONG` / `SQL_INTEGER`.
pub fn bind_i32_array(items: &[ParamValue]) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Int32, CDataType::SLong, SqlDataType::Integer);
    descriptor.param_size = size_of::<i32>() as u64;
    fixed_width(items, descriptor, 0, |v| Ok(v.to_i32()?))
}

/// `SQL_C_ULONG` / `SQL_BIGINT`.
///
/// Unsigned values are declared as `BIGINT` so the full 32-bit range fits
/// the server type.
pub fn bind_u32_array(items: &[ParamValue]) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Uint32, CDataType::ULong, SqlDataType::BigInt);
    descriptor.param_size = size_of::<u32>() as u64;
    fixed_width(items, descriptor, 0, |v| Ok(v.to_u32()?))
}

/// `SQL_C_SBIGINT` / `SQL_BIGINT`.
pub fn bind_i64_array(items: &[ParamValue]) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Number, CDataType::SBigInt, SqlDataType::BigInt);
    descriptor.param_size = size_of::<i64>() as u64;
    fixed_width(items, descriptor, 0, |v| Ok(v.to_i64()?))
}

/// `SQL_C_DOUBLE` / `SQL_DOUBLE`.
pub fn bind_f64_array(items: &[ParamValue]) -> Result<Binding, BindError> {
    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Number, CDataType::Double, SqlDataType::Double);
    descriptor.param_size = size_of::<f64>() as u64;
    fixed_width(items, descriptor, 0, |v| Ok(v.to_f64()?))
}

/// Shared scale for a numeric array with no requested scale: the widest
/// natural scale, narrowed until the longest integer part still fits in
/// 38 digits.
fn shared_numeric_scale(
    values: &[Option<f64>],
    precision: Option<u64>,
) -> Result<Option<i16>, BindError> {
    let mut widest: Option<u32> = None;
    let mut integer_digits = 0u32;
    for v in values.iter().flatten() {
        let (numeric, _, natural) = encode_decimal(*v, precision, None)?;
        let natural = u32::from(natural.unsigned_abs());
        let digits = numeric.magnitude().checked_ilog10().map_or(0, |d| d + 1);
        integer_digits = integer_digits.max(digits.saturating_sub(natural));
        widest = widest.max(Some(natural));
    }
    let room = u32::from(MAX_NUMERIC_PRECISION).saturating_sub(integer_digits);
    Ok(widest.map(|scale| scale.min(room) as i16))
}

/// `SQL_C_NUMERIC` / `SQL_NUMERIC`.
///
/// All elements share one precision and scale: the requested scale if any,
/// otherwise the widest natural scale that leaves room for every integer
/// part. Elements with more fractional digits are rounded.
pub fn bind_numeric_array(
    items: &[ParamValue],
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let values = items
        .iter()
        .map(|item| match item {
            ParamValue::Null => Ok(None),
            other => other.to_f64().map(Some),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scale = match ctx.scale {
        Some(scale) if scale >= 0 => Some(scale),
        _ => shared_numeric_scale(&values, ctx.precision)?,
    };

    let mut encoded = Vec::with_capacity(values.len());
    let mut precision = 0u8;
    let mut digits = 0i8;
    for v in &values {
        match v {
            Some(v) => {
                let (numeric, p, s) = encode_decimal(*v, ctx.precision, scale)?;
                precision = precision.max(p);
                digits = digits.max(s);
                encoded.push(Some(numeric));
            }
            None => encoded.push(None),
        }
    }
    if let Some(stray) = encoded.iter().flatten().find(|n| n.scale != digits) {
        return Err(BindError::InvalidNumberValue(format!(
            "numeric element at scale {} in an array declared at scale {digits}",
            stray.scale
        )));
    }
    if encoded.iter().all(Option::is_none) {
        precision = ctx.precision.map_or(MAX_NUMERIC_PRECISION, |p| {
            p.min(u64::from(MAX_NUMERIC_PRECISION)) as u8
        });
    }

    let mut indicator = vec![SQL_NULL_DATA; items.len()];
    let mut elements = Vec::with_capacity(items.len());
    for (numeric, ind) in encoded.into_iter().zip(indicator.iter_mut()) {
        match numeric {
            Some(mut numeric) => {
                numeric.precision = precision;
                elements.push(numeric);
                *ind = struct_len::<SqlNumericStruct>();
            }
            None => elements.push(SqlNumericStruct::default()),
        }
    }

    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Number, CDataType::Numeric, SqlDataType::Numeric);
    descriptor.param_size = u64::from(precision);
    descriptor.digits = i16::from(digits);
    descriptor.stride = size_of::<SqlNumericStruct>();
    descriptor.buffer_len = descriptor.stride * items.len();
    Ok(Binding::new(
        descriptor,
        PinnedBuffer::from_vec(elements),
        indicator,
    ))
}

/// `SQL_C_BINARY` / `SQL_SS_TIMESTAMPOFFSET`, at the context's UTC offset.
pub fn bind_timestamp_offset_array(
    items: &[ParamValue],
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let mut descriptor = ParamDescriptor::new(
        DynamicKind::Date,
        CDataType::Binary,
        SqlDataType::SsTimestampOffset,
    );
    descriptor.param_size = ctx.config.datetime_precision;
    descriptor.digits = ctx.temporal_scale();
    descriptor.offset_minutes = ctx.offset_minutes;
    fixed_width(
        items,
        descriptor,
        struct_len::<SqlTimestampOffsetStruct>(),
        |v| Ok(to_timestamp_offset_struct(v.to_instant()?, ctx.offset_minutes)?),
    )
}

/// `SQL_C_WCHAR` / `SQL_WVARCHAR`, one slot of the longest element per item.
///
/// The declared size is the slot width in characters, or 0 (`nvarchar(max)`)
/// past the inline limit.
pub fn bind_wide_string_array(
    items: &[ParamValue],
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let encoded = items
        .iter()
        .map(|item| match item {
            ParamValue::Null => Ok(None),
            other => Ok(Some(encode_utf16(&other.to_text()?, None))),
        })
        .collect::<Result<Vec<_>, BindError>>()?;

    let widest = encoded.iter().flatten().map(Vec::len).max().unwrap_or(0);
    let slot = widest.max(1);
    let mut units = vec![0u16; slot * items.len()];
    let mut indicator = vec![SQL_NULL_DATA; items.len()];
    for ((chunk, ind), element) in units
        .chunks_exact_mut(slot)
        .zip(indicator.iter_mut())
        .zip(&encoded)
    {
        if let Some(element) = element {
            chunk[..element.len()].copy_from_slice(element);
            *ind = (element.len() * size_of::<u16>()) as isize;
        }
    }

    let mut descriptor =
        ParamDescriptor::new(DynamicKind::String, CDataType::WChar, SqlDataType::WVarChar);
    descriptor.stride = slot * size_of::<u16>();
    descriptor.buffer_len = descriptor.stride * items.len();
    descriptor.param_size = if slot > ctx.config.max_inline_wide_chars {
        0
    } else {
        slot as u64
    };
    Ok(Binding::new(descriptor, PinnedBuffer::from_vec(units), indicator))
}

/// `SQL_C_BINARY` / `SQL_VARBINARY`, or `SQL_LONGVARBINARY` past the
/// configured threshold.
pub fn bind_binary_array(
    items: &[ParamValue],
    ctx: &BindContext<'_>,
) -> Result<Binding, BindError> {
    let encoded = items
        .iter()
        .map(|item| match item {
            ParamValue::Null => Ok(None),
            other => Ok(Some(other.to_byte_slice()?)),
        })
        .collect::<Result<Vec<_>, BindError>>()?;

    let widest = encoded.iter().flatten().map(|b| b.len()).max().unwrap_or(0);
    let slot = widest.max(1);
    let mut bytes = vec![0u8; slot * items.len()];
    let mut indicator = vec![SQL_NULL_DATA; items.len()];
    for ((chunk, ind), element) in bytes
        .chunks_exact_mut(slot)
        .zip(indicator.iter_mut())
        .zip(&encoded)
    {
        if let Some(element) = element {
            chunk[..element.len()].copy_from_slice(element);
            *ind = element.len() as isize;
        }
    }

    let sql_type = if widest > ctx.config.long_binary_threshold {
        SqlDataType::LongVarBinary
    } else {
        SqlDataType::VarBinary
    };
    let mut descriptor = ParamDescriptor::new(DynamicKind::Buffer, CDataType::Binary, sql_type);
    descriptor.stride = slot;
    descriptor.buffer_len = slot * items.len();
    descriptor.param_size = slot as u64;
    Ok(Binding::new(descriptor, PinnedBuffer::from_vec(bytes), indicator))
}

/// Value families an array element can belong to, in classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Bool,
    String,
    Date,
    Buffer,
    OutOfBounds,
    Number,
    Int64,
    Int32,
    Uint32,
    Null,
    Other,
}

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn family_of(value: &ParamValue) -> Family {
    match value {
        ParamValue::Null => Family::Null,
        ParamValue::Bool(_) => Family::Bool,
        ParamValue::String(_) => Family::String,
        ParamValue::Date(_) => Family::Date,
        ParamValue::Buffer(_) => Family::Buffer,
        ParamValue::Int32(_) => Family::Int32,
        ParamValue::Uint32(_) => Family::Uint32,
        ParamValue::Number(v) if !v.is_finite() => Family::OutOfBounds,
        ParamValue::Number(v) if v.fract() == 0.0 => {
            if v.abs() > MAX_SAFE_INTEGER {
                Family::OutOfBounds
            } else {
                Family::Int64
            }
        }
        ParamValue::Number(_) => Family::Number,
        ParamValue::Array(_) | ParamValue::Directive(_) | ParamValue::Tvp(_) => Family::Other,
    }
}

/// Per-family element counts of one array.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArrayTally {
    /// Booleans.
    pub bools: usize,
    /// Strings.
    pub strings: usize,
    /// Dates.
    pub dates: usize,
    /// Byte buffers.
    pub buffers: usize,
    /// NaN, infinities and integers past 2^53 - 1.
    pub out_of_bounds: usize,
    /// Non-integral numbers.
    pub numbers: usize,
    /// Integral numbers within the safe range.
    pub int64s: usize,
    /// Signed 32-bit integers.
    pub int32s: usize,
    /// Unsigned 32-bit integers.
    pub uint32s: usize,
    /// NULLs.
    pub nulls: usize,
    /// Elements no array encoder accepts.
    pub others: usize,
}

impl ArrayTally {
    /// Count the families of every element in one pass.
    #[must_use]
    pub fn scan(items: &[ParamValue]) -> Self {
        let mut tally = Self::default();
        for item in items {
            match family_of(item) {
                Family::Bool => tally.bools += 1,
                Family::String => tally.strings += 1,
                Family::Date => tally.dates += 1,
                Family::Buffer => tally.buffers += 1,
                Family::OutOfBounds => tally.out_of_bounds += 1,
                Family::Number => tally.numbers += 1,
                Family::Int64 => tally.int64s += 1,
                Family::Int32 => tally.int32s += 1,
                Family::Uint32 => tally.uint32s += 1,
                Family::Null => tally.nulls += 1,
                Family::Other => tally.others += 1,
            }
        }
        tally
    }
}

/// Classify an array by its element families and encode it.
///
/// Families are tried in a fixed priority order; the first family present
/// decides the encoder for every element.
pub fn bind_array(items: &[ParamValue], ctx: &BindContext<'_>) -> Result<Binding, BindError> {
    let tally = ArrayTally::scan(items);
    tracing::trace!(elements = items.len(), tally = ?tally, "classifying array");

    if tally.others > 0 {
        return Err(BindError::InvalidParameterType(format!(
            "array holds {} element(s) that are not scalars",
            tally.others
        )));
    }
    if tally.bools > 0 {
        bind_bool_array(items)
    } else if tally.strings > 0 {
        bind_wide_string_array(items, ctx)
    } else if tally.dates > 0 {
        bind_timestamp_offset_array(items, ctx)
    } else if tally.buffers > 0 {
        bind_binary_array(items, ctx)
    } else if tally.out_of_bounds > 0 {
        Err(BindError::InvalidNumberValue(format!(
            "array holds {} number(s) outside the safe integer range",
            tally.out_of_bounds
        )))
    } else if tally.numbers > 0 {
        bind_f64_array(items)
    } else if tally.int64s > 0 {
        bind_i64_array(items)
    } else if tally.int32s > 0 {
        bind_i32_array(items)
    } else if tally.uint32s > 0 {
        bind_u32_array(items)
    } else {
        Ok(bind_null_array(items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaKind;
    use crate::config::BindConfig;
    use bytes::Bytes;

    fn ctx(config: &BindConfig) -> BindContext<'_> {
        BindContext::new(config)
    }

    #[test]
    fn test_wide_string_array_layout() {
        let config = BindConfig::default();
        let items = vec!["a".into(), ParamValue::Null, "bb".into()];
        let binding = bind_array(&items, &ctx(&config)).unwrap();

        let desc = binding.descriptor();
        assert_eq!(desc.sql_type, SqlDataType::WVarChar);
        assert_eq!(desc.stride, 4);
        assert_eq!(desc.param_size, 2);
        assert_eq!(binding.indicator(), &[2, SQL_NULL_DATA, 4]);
        assert_eq!(
            binding.buffer().get::<u16>().unwrap(),
            &[0x61, 0, 0, 0, 0x62, 0x62]
        );
    }

    #[test]
    fn test_bool_wins_over_string() {
        let config = BindConfig::default();
        let items: Vec<ParamValue> = vec![true.into(), "a".into()];
        let binding = bind_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.descriptor().sql_type, SqlDataType::Bit);
        assert_eq!(binding.buffer().get::<u8>().unwrap(), &[1, 1]);
    }

    #[test]
    fn test_integral_numbers_bind_as_bigint() {
        let config = BindConfig::default();
        let items: Vec<ParamValue> = vec![1.0.into(), 2.0.into(), 3.into()];
        let binding = bind_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.descriptor().c_type, CDataType::SBigInt);
        assert_eq!(binding.buffer().get::<i64>().unwrap(), &[1, 2, 3]);
        assert_eq!(binding.descriptor().buffer_len, 24);
    }

    #[test]
    fn test_fraction_forces_double() {
        let config = BindConfig::default();
        let items = vec![1.0.into(), 2.5.into(), ParamValue::Null];
        let binding = bind_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.buffer().kind(), ArenaKind::Double);
        assert_eq!(binding.indicator(), &[0, 0, SQL_NULL_DATA]);
    }

    #[test]
    fn test_out_of_bounds_number_fails_whole_array() {
        let config = BindConfig::default();
        let items: Vec<ParamValue> = vec![1.0.into(), 2f64.powi(60).into()];
        let err = bind_array(&items, &ctx(&config)).unwrap_err();
        assert!(err.is_number_error());

        let items = vec![ParamValue::Number(f64::INFINITY)];
        assert!(bind_array(&items, &ctx(&config)).unwrap_err().is_number_error());
    }

    #[test]
    fn test_all_null_array() {
        let config = BindConfig::default();
        let items = vec![ParamValue::Null; 3];
        let binding = bind_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.descriptor().kind, DynamicKind::Null);
        assert_eq!(binding.indicator(), &[SQL_NULL_DATA; 3]);
        assert!(binding.buffer().as_ptr().is_null());
    }

    #[test]
    fn test_nested_array_is_rejected() {
        let config = BindConfig::default();
        let items = vec![ParamValue::Array(vec![1.into()])];
        assert!(bind_array(&items, &ctx(&config)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_nested_array_beside_scalars_is_rejected() {
        let config = BindConfig::default();
        let cases: Vec<Vec<ParamValue>> = vec![
            vec![true.into(), ParamValue::Array(vec![1.into()])],
            vec!["a".into(), ParamValue::Array(vec![1.into(), 2.into()])],
            vec![1.into(), ParamValue::typed(mssql_types::TypedParam::new(4, 1))],
        ];
        for items in cases {
            assert!(bind_array(&items, &ctx(&config)).unwrap_err().is_type_error());
        }
    }

    #[test]
    fn test_binary_array_threshold() {
        let config = BindConfig::default().long_binary_threshold(3);
        let items: Vec<ParamValue> = vec![
            Bytes::from_static(b"ab").into(),
            Bytes::from_static(b"abcd").into(),
        ];
        let binding = bind_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.descriptor().sql_type, SqlDataType::LongVarBinary);
        assert_eq!(binding.descriptor().stride, 4);
        assert_eq!(binding.indicator(), &[2, 4]);
        assert_eq!(binding.buffer().get::<u8>().unwrap(), b"ab\0\0abcd");
    }

    #[test]
    fn test_number_in_binary_array_is_rejected() {
        let config = BindConfig::default();
        let items: Vec<ParamValue> = vec![Bytes::from_static(b"ab").into(), 1.into()];
        assert!(bind_array(&items, &ctx(&config)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_numeric_array_shares_scale() {
        let config = BindConfig::default();
        let items = vec![1.5.into(), 12.25.into(), ParamValue::Null];
        let binding = bind_numeric_array(&items, &ctx(&config)).unwrap();

        let desc = binding.descriptor();
        assert_eq!(desc.digits, 2);
        assert_eq!(desc.param_size, 4);
        let numerics = binding.buffer().get::<SqlNumericStruct>().unwrap();
        assert_eq!(numerics[0].magnitude(), 150);
        assert_eq!(numerics[1].magnitude(), 1225);
        assert!(numerics.iter().take(2).all(|n| n.scale == 2 && n.precision == 4));
        assert_eq!(binding.indicator()[2], SQL_NULL_DATA);
    }

    #[test]
    fn test_numeric_array_mixed_magnitudes() {
        let config = BindConfig::default();
        let items = vec![1e-20.into(), 1e20.into()];
        let binding = bind_numeric_array(&items, &ctx(&config)).unwrap();

        // 21 integer digits leave room for 17 fractional ones.
        let desc = binding.descriptor();
        assert_eq!((desc.param_size, desc.digits), (38, 17));
        let numerics = binding.buffer().get::<SqlNumericStruct>().unwrap();
        assert!(numerics.iter().all(|n| n.scale == 17));
        assert_eq!(numerics[0].magnitude(), 0);
        assert_eq!(numerics[1].magnitude(), 10u128.pow(37));
    }

    #[test]
    fn test_numeric_array_requested_scale_too_wide() {
        let config = BindConfig::default();
        let mut context = ctx(&config);
        context.scale = Some(20);
        let items = vec![1e-20.into(), 1e20.into()];
        let err = bind_numeric_array(&items, &context).unwrap_err();
        assert!(err.is_number_error());
    }

    #[test]
    fn test_numeric_array_beyond_96_bits() {
        let config = BindConfig::default();
        let items = vec![1e29.into(), (-2.5).into()];
        let binding = bind_numeric_array(&items, &ctx(&config)).unwrap();
        assert_eq!(binding.descriptor().digits, 1);
        let numerics = binding.buffer().get::<SqlNumericStruct>().unwrap();
        assert_eq!(numerics[0].magnitude(), 10u128.pow(30));
        assert_eq!(numerics[1].magnitude(), 25);
        assert!(numerics[1].is_negative());
    }

    #[test]
    fn test_timestamp_offset_array_uses_offset() {
        let config = BindConfig::default();
        let mut context = ctx(&config);
        context.offset_minutes = 90;
        let items = vec![ParamValue::date_from_millis(0).unwrap()];
        let binding = bind_timestamp_offset_array(&items, &context).unwrap();

        let ts = binding.buffer().get::<SqlTimestampOffsetStruct>().unwrap()[0];
        assert_eq!((ts.hour, ts.minute), (1, 30));
        assert_eq!(ts.offset_minutes(), 90);
        assert_eq!(binding.descriptor().offset_minutes, 90);
        assert_eq!(binding.indicator(), &[20]);
    }
}
