//! Decoding of native ODBC representations back into values.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::TypeError;
use crate::native::{
    SqlDateStruct, SqlNumericStruct, SqlTimeStruct, SqlTimestampOffsetStruct, SqlTimestampStruct,
};

/// Decode UTF-16 code units up to the first NUL terminator.
pub fn decode_utf16_string(units: &[u16]) -> Result<String, TypeError> {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16(&units[..end]).map_err(|e| TypeError::InvalidEncoding(e.to_string()))
}

fn naive_date(year: i16, month: u16, day: u16) -> Result<NaiveDate, TypeError> {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .ok_or_else(|| TypeError::InvalidDateTime(format!("{year:04}-{month:02}-{day:02}")))
}

fn naive_time(hour: u16, minute: u16, second: u16, fraction: u32) -> Result<NaiveTime, TypeError> {
    NaiveTime::from_hms_nano_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
        fraction,
    )
    .ok_or_else(|| TypeError::InvalidDateTime(format!("{hour:02}:{minute:02}:{second:02}.{fraction}")))
}

/// Decode a `SQL_DATE_STRUCT` as midnight UTC on that date.
pub fn from_date_struct(date: &SqlDateStruct) -> Result<DateTime<Utc>, TypeError> {
    let date = naive_date(date.year, date.month, date.day)?;
    Ok(NaiveDateTime::new(date, NaiveTime::MIN).and_utc())
}

/// Decode a `SQL_SS_TIME2_STRUCT` as that time of day on 1970-01-01 UTC.
pub fn from_time_struct(time: &SqlTimeStruct) -> Result<DateTime<Utc>, TypeError> {
    let time = naive_time(time.hour, time.minute, time.second, time.fraction)?;
    Ok(NaiveDateTime::new(NaiveDate::default(), time).and_utc())
}

/// Decode a `SQL_TIMESTAMP_STRUCT` as a UTC instant.
pub fn from_timestamp_struct(ts: &SqlTimestampStruct) -> Result<DateTime<Utc>, TypeError> {
    let date = naive_date(ts.year, ts.month, ts.day)?;
    let time = naive_time(ts.hour, ts.minute, ts.second, ts.fraction)?;
    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Decode a `SQL_SS_TIMESTAMPOFFSET_STRUCT` into the UTC instant it denotes.
pub fn from_timestamp_offset_struct(
    ts: &SqlTimestampOffsetStruct,
) -> Result<DateTime<Utc>, TypeError> {
    let date = naive_date(ts.year, ts.month, ts.day)?;
    let time = naive_time(ts.hour, ts.minute, ts.second, ts.fraction)?;
    let local = NaiveDateTime::new(date, time);
    local
        .checked_sub_signed(Duration::minutes(i64::from(ts.offset_minutes())))
        .map(|utc| utc.and_utc())
        .ok_or_else(|| TypeError::InvalidDateTime(format!("{local} at offset {}m", ts.offset_minutes())))
}

/// Decode a `SQL_NUMERIC_STRUCT` into an exact decimal.
pub fn decode_decimal(numeric: &SqlNumericStruct) -> Result<Decimal, TypeError> {
    let magnitude = i128::try_from(numeric.magnitude())
        .map_err(|_| TypeError::InvalidDecimal("magnitude exceeds 127 bits".to_string()))?;
    let signed = if numeric.is_negative() { -magnitude } else { magnitude };
    let scale = u32::try_from(numeric.scale)
        .map_err(|_| TypeError::InvalidDecimal(format!("negative scale {}", numeric.scale)))?;
    Decimal::try_from_i128_with_scale(signed, scale)
        .map_err(|e| TypeError::InvalidDecimal(e.to_string()))
}

/// Decode a `SQL_NUMERIC_STRUCT` into the nearest floating value.
///
/// The exact decimal is rounded once, so a struct produced by
/// [`encode_decimal`](crate::encode_decimal) at its natural scale decodes
/// to the original value.
pub fn numeric_to_f64(numeric: &SqlNumericStruct) -> Result<f64, TypeError> {
    let rendered = format!("{}e{}", numeric.magnitude(), -i32::from(numeric.scale));
    let magnitude: f64 = rendered
        .parse()
        .map_err(|_| TypeError::InvalidDecimal(rendered.clone()))?;
    Ok(if numeric.is_negative() { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_decimal, to_time_struct, to_timestamp_offset_struct};

    #[test]
    fn test_decode_utf16_stops_at_nul() {
        assert_eq!(decode_utf16_string(&[0x61, 0x62, 0, 0x63]).unwrap(), "ab");
        assert_eq!(decode_utf16_string(&[0x61, 0x62]).unwrap(), "ab");
    }

    #[test]
    fn test_decode_utf16_lone_surrogate_fails() {
        assert!(matches!(
            decode_utf16_string(&[0xD800]),
            Err(TypeError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_timestamp_offset_round_trip() {
        let at = DateTime::from_timestamp_millis(1_705_326_330_500).unwrap();
        let ts = to_timestamp_offset_struct(at, 330).unwrap();
        assert_eq!(from_timestamp_offset_struct(&ts).unwrap(), at);
    }

    #[test]
    fn test_time_struct_decodes_on_epoch_day() {
        let at = DateTime::from_timestamp_millis(45_296_007).unwrap();
        let time = to_time_struct(at, 0).unwrap();
        assert_eq!(from_time_struct(&time).unwrap(), at);
    }

    #[test]
    fn test_invalid_date_struct() {
        let bad = SqlDateStruct {
            year: 2023,
            month: 2,
            day: 30,
        };
        assert!(matches!(
            from_date_struct(&bad),
            Err(TypeError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_numeric_round_trip() {
        let (ns, _, _) = encode_decimal(-12.34, None, None).unwrap();
        assert_eq!(numeric_to_f64(&ns).unwrap(), -12.34);
        assert_eq!(decode_decimal(&ns).unwrap().to_string(), "-12.34");
    }

    #[test]
    fn test_numeric_to_f64_rounds_once() {
        for v in [123456789.12345679, 0.1 + 0.2, 9007199254740993.0, 1.7e37, 3.3e-25, -4.9e-12] {
            let (ns, _, _) = encode_decimal(v, None, None).unwrap();
            assert_eq!(numeric_to_f64(&ns).unwrap(), v, "{v:e}");
        }
    }

    #[test]
    fn test_numeric_to_f64_beyond_rust_decimal() {
        let (ns, _, _) = encode_decimal(1e37, None, None).unwrap();
        assert_eq!(numeric_to_f64(&ns).unwrap(), 1e37);
        assert!(matches!(
            decode_decimal(&ns),
            Err(TypeError::InvalidDecimal(_))
        ));
    }
}
