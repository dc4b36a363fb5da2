//! Encoding of values into native ODBC representations.
//!
//! Temporal values are converted from a UTC instant plus an offset in
//! minutes; decimals are converted from a floating value plus a requested
//! precision and scale.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};

use crate::error::TypeError;
use crate::native::{
    SqlDateStruct, SqlNumericStruct, SqlTimeStruct, SqlTimestampOffsetStruct, SqlTimestampStruct,
};

/// Largest precision SQL Server accepts for `NUMERIC`/`DECIMAL`.
pub const MAX_NUMERIC_PRECISION: u8 = 38;

/// Encode a string as UTF-16 code units, optionally capped at `limit` units.
///
/// A cap never splits a surrogate pair; the dangling high surrogate is dropped.
#[must_use]
pub fn encode_utf16(s: &str, limit: Option<usize>) -> Vec<u16> {
    let mut units: Vec<u16> = match limit {
        Some(limit) => s.encode_utf16().take(limit).collect(),
        None => s.encode_utf16().collect(),
    };
    if limit.is_some_and(|limit| units.len() == limit) {
        if let Some(&last) = units.last() {
            if (0xD800..0xDC00).contains(&last) {
                units.pop();
            }
        }
    }
    units
}

/// Encode a string as UTF-8 bytes, capped at `limit` bytes on a char boundary.
#[must_use]
pub fn encode_utf8(s: &str, limit: Option<usize>) -> &[u8] {
    match limit {
        Some(limit) if limit < s.len() => {
            let mut end = limit;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            &s.as_bytes()[..end]
        }
        _ => s.as_bytes(),
    }
}

fn local_time(instant: DateTime<Utc>, offset_minutes: i32) -> Result<NaiveDateTime, TypeError> {
    instant
        .naive_utc()
        .checked_add_signed(Duration::minutes(i64::from(offset_minutes)))
        .ok_or_else(|| TypeError::InvalidDateTime(format!("{instant} offset by {offset_minutes}m")))
}

fn year_of(local: &NaiveDateTime) -> Result<i16, TypeError> {
    i16::try_from(local.year())
        .map_err(|_| TypeError::InvalidDateTime(format!("year {} does not fit", local.year())))
}

// chrono reports leap seconds as nanosecond values past 1e9.
fn fraction_of(local: &NaiveDateTime) -> u32 {
    local.nanosecond() % 1_000_000_000
}

/// Convert an instant to a `SQL_DATE_STRUCT` at the given offset.
pub fn to_date_struct(
    instant: DateTime<Utc>,
    offset_minutes: i32,
) -> Result<SqlDateStruct, TypeError> {
    let local = local_time(instant, offset_minutes)?;
    Ok(SqlDateStruct {
        year: year_of(&local)?,
        month: local.month() as u16,
        day: local.day() as u16,
    })
}

/// Convert an instant to a `SQL_SS_TIME2_STRUCT` at the given offset.
pub fn to_time_struct(
    instant: DateTime<Utc>,
    offset_minutes: i32,
) -> Result<SqlTimeStruct, TypeError> {
    let local = local_time(instant, offset_minutes)?;
    Ok(SqlTimeStruct {
        hour: local.hour() as u16,
        minute: local.minute() as u16,
        second: local.second() as u16,
        fraction: fraction_of(&local),
    })
}

/// Convert an instant to a `SQL_TIMESTAMP_STRUCT` at the given offset.
pub fn to_timestamp_struct(
    instant: DateTime<Utc>,
    offset_minutes: i32,
) -> Result<SqlTimestampStruct, TypeError> {
    let local = local_time(instant, offset_minutes)?;
    Ok(SqlTimestampStruct {
        year: year_of(&local)?,
        month: local.month() as u16,
        day: local.day() as u16,
        hour: local.hour() as u16,
        minute: local.minute() as u16,
        second: local.second() as u16,
        fraction: fraction_of(&local),
    })
}

/// Convert an instant to a `SQL_SS_TIMESTAMPOFFSET_STRUCT`.
///
/// The calendar fields hold the local time at `offset_minutes`.
pub fn to_timestamp_offset_struct(
    instant: DateTime<Utc>,
    offset_minutes: i32,
) -> Result<SqlTimestampOffsetStruct, TypeError> {
    if offset_minutes.abs() > 14 * 60 {
        return Err(TypeError::InvalidDateTime(format!(
            "timezone offset {offset_minutes}m beyond 14 hours"
        )));
    }
    let ts = to_timestamp_struct(instant, offset_minutes)?;
    Ok(SqlTimestampOffsetStruct {
        year: ts.year,
        month: ts.month,
        day: ts.day,
        hour: ts.hour,
        minute: ts.minute,
        second: ts.second,
        fraction: ts.fraction,
        timezone_hour: (offset_minutes / 60) as i16,
        timezone_minute: (offset_minutes % 60) as i16,
    })
}

fn digit_count(mut magnitude: u128) -> u8 {
    let mut digits = 1;
    while magnitude >= 10 {
        magnitude /= 10;
        digits += 1;
    }
    digits
}

/// Shortest round-tripping digits of `|value|` and the power of ten of the
/// last digit.
fn shortest_digits(value: f64) -> Result<(u128, i32), TypeError> {
    // `{:e}` renders as `d.ddde<exp>` with the fewest digits that read back.
    let rendered = format!("{:e}", value.abs());
    let invalid = || TypeError::InvalidDecimal(rendered.clone());
    let (mantissa, exponent) = rendered.split_once('e').ok_or_else(invalid)?;
    let exponent: i32 = exponent.parse().map_err(|_| invalid())?;
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let magnitude: u128 = digits.parse().map_err(|_| invalid())?;
    Ok((magnitude, exponent - (digits.len() as i32 - 1)))
}

/// Move `magnitude` from scale `from` to scale `to`, rounding half away
/// from zero. `None` on overflow.
fn rescale(magnitude: u128, from: u32, to: u32) -> Option<u128> {
    if to >= from {
        return magnitude.checked_mul(10u128.checked_pow(to - from)?);
    }
    let Some(divisor) = 10u128.checked_pow(from - to) else {
        return Some(0);
    };
    let (quotient, remainder) = (magnitude / divisor, magnitude % divisor);
    Some(if remainder >= divisor - remainder {
        quotient + 1
    } else {
        quotient
    })
}

/// Encode a floating value as a `SQL_NUMERIC_STRUCT`.
///
/// With no requested scale the shortest decimal rendering of `value` is
/// used; a requested scale rounds or pads to exactly that many digits.
/// Scales are capped at 38, and a magnitude needing more than 38 digits
/// at the chosen scale is an [`TypeError::InvalidNumber`]. Returns the
/// struct together with the precision and scale actually encoded, which
/// may be wider than requested.
pub fn encode_decimal(
    value: f64,
    precision: Option<u64>,
    scale: Option<i16>,
) -> Result<(SqlNumericStruct, u8, i8), TypeError> {
    if !value.is_finite() {
        return Err(TypeError::InvalidNumber(value));
    }

    let max_scale = u32::from(MAX_NUMERIC_PRECISION);
    let (digits, exponent) = shortest_digits(value)?;
    let (unscaled, natural_scale) = if exponent >= 0 {
        let factor = 10u128
            .checked_pow(exponent.unsigned_abs())
            .ok_or(TypeError::InvalidNumber(value))?;
        let unscaled = digits
            .checked_mul(factor)
            .ok_or(TypeError::InvalidNumber(value))?;
        (unscaled, 0)
    } else {
        (digits, exponent.unsigned_abs())
    };
    let target_scale = match scale {
        Some(scale) if scale >= 0 => u32::from(scale.unsigned_abs()).min(max_scale),
        _ => natural_scale.min(max_scale),
    };

    let magnitude = rescale(unscaled, natural_scale, target_scale)
        .filter(|&m| digit_count(m) <= MAX_NUMERIC_PRECISION)
        .ok_or(TypeError::InvalidNumber(value))?;
    let actual_scale = target_scale as u8;
    let requested = precision
        .map(|p| p.min(u64::from(MAX_NUMERIC_PRECISION)) as u8)
        .unwrap_or(0);
    let actual_precision = requested
        .max(digit_count(magnitude))
        .max(actual_scale)
        .min(MAX_NUMERIC_PRECISION);

    let numeric = SqlNumericStruct {
        precision: actual_precision,
        scale: actual_scale as i8,
        sign: u8::from(!(value.is_sign_negative() && magnitude != 0)),
        val: magnitude.to_le_bytes(),
    };
    Ok((numeric, actual_precision, actual_scale as i8))
}
