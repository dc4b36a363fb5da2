//! Native ODBC structures handed to the driver by address.
//!
//! Layouts follow `sql.h`/`sqlncli.h` exactly; the driver reads and writes
//! these through raw pointers, so every struct is `#[repr(C)]`.

/// Size of the little-endian magnitude in [`SqlNumericStruct`].
pub const SQL_MAX_NUMERIC_LEN: usize = 16;

/// `SQL_DATE_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlDateStruct {
    /// Year.
    pub year: i16,
    /// Month, 1-12.
    pub month: u16,
    /// Day of month, 1-31.
    pub day: u16,
}

/// `SQL_SS_TIME2_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlTimeStruct {
    /// Hour, 0-23.
    pub hour: u16,
    /// Minute, 0-59.
    pub minute: u16,
    /// Second, 0-59.
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

/// `SQL_TIMESTAMP_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlTimestampStruct {
    /// Year.
    pub year: i16,
    /// Month, 1-12.
    pub month: u16,
    /// Day of month, 1-31.
    pub day: u16,
    /// Hour, 0-23.
    pub hour: u16,
    /// Minute, 0-59.
    pub minute: u16,
    /// Second, 0-59.
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

/// `SQL_SS_TIMESTAMPOFFSET_STRUCT`.
///
/// The calendar fields hold local time at the given offset. Hour and minute
/// offsets always carry the same sign.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlTimestampOffsetStruct {
    /// Year.
    pub year: i16,
    /// Month, 1-12.
    pub month: u16,
    /// Day of month, 1-31.
    pub day: u16,
    /// Hour, 0-23.
    pub hour: u16,
    /// Minute, 0-59.
    pub minute: u16,
    /// Second, 0-59.
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
    /// Offset hours from UTC.
    pub timezone_hour: i16,
    /// Offset minutes from UTC.
    pub timezone_minute: i16,
}

impl SqlTimestampOffsetStruct {
    /// Total UTC offset in minutes.
    #[must_use]
    pub fn offset_minutes(&self) -> i32 {
        i32::from(self.timezone_hour) * 60 + i32::from(self.timezone_minute)
    }
}

/// `SQL_NUMERIC_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlNumericStruct {
    /// Total number of digits.
    pub precision: u8,
    /// Digits to the right of the decimal point.
    pub scale: i8,
    /// 1 for positive, 0 for negative.
    pub sign: u8,
    /// Unscaled magnitude, little-endian.
    pub val: [u8; SQL_MAX_NUMERIC_LEN],
}

impl SqlNumericStruct {
    /// Unscaled magnitude as an integer.
    #[must_use]
    pub fn magnitude(&self) -> u128 {
        u128::from_le_bytes(self.val)
    }

    /// Whether the value is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.sign == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes_match_driver_headers() {
        assert_eq!(size_of::<SqlDateStruct>(), 6);
        assert_eq!(size_of::<SqlTimeStruct>(), 12);
        assert_eq!(size_of::<SqlTimestampStruct>(), 16);
        assert_eq!(size_of::<SqlTimestampOffsetStruct>(), 20);
        assert_eq!(size_of::<SqlNumericStruct>(), 19);
    }

    #[test]
    fn test_offset_minutes() {
        let ts = SqlTimestampOffsetStruct {
            timezone_hour: -5,
            timezone_minute: -30,
            ..Default::default()
        };
        assert_eq!(ts.offset_minutes(), -330);
    }
}
