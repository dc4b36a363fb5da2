//! Binding configuration.

/// Thresholds and server defaults used while laying out parameter buffers.
///
/// The defaults match SQL Server 2008 and later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindConfig {
    /// Longest wide string declared with an explicit size (default: 4000).
    ///
    /// Longer strings are declared with size 0, i.e. `nvarchar(max)`.
    pub max_inline_wide_chars: usize,
    /// Binary values wider than this are bound as `SQL_LONGVARBINARY`
    /// (default: 2000).
    pub long_binary_threshold: usize,
    /// Declared size for `time` parameters (default: 16).
    pub time_precision: u64,
    /// Declared size for date and `datetimeoffset` parameters (default: 34).
    pub datetime_precision: u64,
    /// Declared size for `datetime2` parameters (default: 27).
    pub timestamp_precision: u64,
    /// Fractional-second digits for temporal parameters (default: 7).
    pub datetime_scale: i16,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_inline_wide_chars: 4000,
            long_binary_threshold: 2000,
            time_precision: 16,
            datetime_precision: 34,
            timestamp_precision: 27,
            datetime_scale: 7,
        }
    }
}

impl BindConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the longest wide string declared with an explicit size.
    #[must_use]
    pub fn max_inline_wide_chars(mut self, chars: usize) -> Self {
        self.max_inline_wide_chars = chars;
        self
    }

    /// Set the width above which binary values become `SQL_LONGVARBINARY`.
    #[must_use]
    pub fn long_binary_threshold(mut self, bytes: usize) -> Self {
        self.long_binary_threshold = bytes;
        self
    }

    /// Set the declared sizes for time, date/offset and timestamp parameters.
    #[must_use]
    pub fn temporal_precisions(mut self, time: u64, datetime: u64, timestamp: u64) -> Self {
        self.time_precision = time;
        self.datetime_precision = datetime;
        self.timestamp_precision = timestamp;
        self
    }

    /// Set the default fractional-second digits for temporal parameters.
    #[must_use]
    pub fn datetime_scale(mut self, scale: i16) -> Self {
        self.datetime_scale = scale;
        self
    }
}

/// Per-value overrides applied on top of a [`BindConfig`].
///
/// Explicit SQL type directives carry a precision, a scale and a UTC offset
/// that the encoders honor in place of their defaults.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    /// Shared configuration.
    pub config: &'a BindConfig,
    /// Requested precision (character cap for text).
    pub precision: Option<u64>,
    /// Requested scale.
    pub scale: Option<i16>,
    /// UTC offset for timestamp-with-offset values, in minutes.
    pub offset_minutes: i32,
}

impl<'a> BindContext<'a> {
    /// Context with no overrides.
    #[must_use]
    pub fn new(config: &'a BindConfig) -> Self {
        Self {
            config,
            precision: None,
            scale: None,
            offset_minutes: 0,
        }
    }

    /// Requested precision as a character limit, ignoring zero.
    pub(crate) fn char_limit(&self) -> Option<usize> {
        self.precision
            .filter(|&p| p > 0)
            .map(|p| usize::try_from(p).unwrap_or(usize::MAX))
    }

    /// Fractional-second digits: the requested scale if positive, else the default.
    pub(crate) fn temporal_scale(&self) -> i16 {
        self.scale
            .filter(|&s| s > 0)
            .unwrap_or(self.config.datetime_scale)
    }
}
