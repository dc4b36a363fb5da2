//! ODBC type codes.
//!
//! These correspond to the `SQL_*` and `SQL_C_*` constants from `sql.h`,
//! `sqlext.h` and the SQL Server driver header, and are passed to the driver
//! unchanged.

/// SQL data type identifiers (`SQL_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum SqlDataType {
    /// `SQL_CHAR`.
    Char = 1,
    /// `SQL_NUMERIC`.
    Numeric = 2,
    /// `SQL_DECIMAL`.
    Decimal = 3,
    /// `SQL_INTEGER`.
    Integer = 4,
    /// `SQL_SMALLINT`.
    SmallInt = 5,
    /// `SQL_FLOAT`.
    Float = 6,
    /// `SQL_REAL`.
    Real = 7,
    /// `SQL_DOUBLE`.
    Double = 8,
    /// `SQL_DATETIME`.
    DateTime = 9,
    /// `SQL_TIMESTAMP` (ODBC 2.x).
    Timestamp = 11,
    /// `SQL_VARCHAR`.
    VarChar = 12,
    /// `SQL_TYPE_DATE`.
    TypeDate = 91,
    /// `SQL_TYPE_TIME`.
    TypeTime = 92,
    /// `SQL_TYPE_TIMESTAMP`.
    TypeTimestamp = 93,
    /// `SQL_LONGVARCHAR`.
    LongVarChar = -1,
    /// `SQL_BINARY`.
    Binary = -2,
    /// `SQL_VARBINARY`.
    VarBinary = -3,
    /// `SQL_LONGVARBINARY`.
    LongVarBinary = -4,
    /// `SQL_BIGINT`.
    BigInt = -5,
    /// `SQL_TINYINT`.
    TinyInt = -6,
    /// `SQL_BIT`.
    Bit = -7,
    /// `SQL_WCHAR`.
    WChar = -8,
    /// `SQL_WVARCHAR`.
    WVarChar = -9,
    /// `SQL_WLONGVARCHAR`.
    WLongVarChar = -10,
    /// `SQL_GUID`.
    Guid = -11,
    /// `SQL_SS_VARIANT`.
    SsVariant = -150,
    /// `SQL_SS_UDT`.
    SsUdt = -151,
    /// `SQL_SS_XML`.
    SsXml = -152,
    /// `SQL_SS_TABLE`.
    SsTable = -153,
    /// `SQL_SS_TIME2`.
    SsTime2 = -154,
    /// `SQL_SS_TIMESTAMPOFFSET`.
    SsTimestampOffset = -155,
}

impl SqlDataType {
    /// Look up a SQL type from its raw code.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Char),
            2 => Some(Self::Numeric),
            3 => Some(Self::Decimal),
            4 => Some(Self::Integer),
            5 => Some(Self::SmallInt),
            6 => Some(Self::Float),
            7 => Some(Self::Real),
            8 => Some(Self::Double),
            9 => Some(Self::DateTime),
            11 => Some(Self::Timestamp),
            12 => Some(Self::VarChar),
            91 => Some(Self::TypeDate),
            92 => Some(Self::TypeTime),
            93 => Some(Self::TypeTimestamp),
            -1 => Some(Self::LongVarChar),
            -2 => Some(Self::Binary),
            -3 => Some(Self::VarBinary),
            -4 => Some(Self::LongVarBinary),
            -5 => Some(Self::BigInt),
            -6 => Some(Self::TinyInt),
            -7 => Some(Self::Bit),
            -8 => Some(Self::WChar),
            -9 => Some(Self::WVarChar),
            -10 => Some(Self::WLongVarChar),
            -11 => Some(Self::Guid),
            -150 => Some(Self::SsVariant),
            -151 => Some(Self::SsUdt),
            -152 => Some(Self::SsXml),
            -153 => Some(Self::SsTable),
            -154 => Some(Self::SsTime2),
            -155 => Some(Self::SsTimestampOffset),
            _ => None,
        }
    }

    /// Raw code passed to the driver.
    #[must_use]
    pub const fn code(self) -> i16 {
        self as i16
    }
}

/// C data type identifiers (`SQL_C_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum CDataType {
    /// `SQL_C_CHAR`.
    Char = 1,
    /// `SQL_C_NUMERIC`.
    Numeric = 2,
    /// `SQL_C_DOUBLE`.
    Double = 8,
    /// `SQL_C_TYPE_DATE`.
    TypeDate = 91,
    /// `SQL_C_TYPE_TIMESTAMP`.
    TypeTimestamp = 93,
    /// `SQL_C_DEFAULT`.
    Default = 99,
    /// `SQL_C_BINARY`.
    Binary = -2,
    /// `SQL_C_BIT`.
    Bit = -7,
    /// `SQL_C_WCHAR`.
    WChar = -8,
    /// `SQL_C_SLONG`.
    SLong = -16,
    /// `SQL_C_ULONG`.
    ULong = -18,
    /// `SQL_C_SBIGINT`.
    SBigInt = -25,
}

impl CDataType {
    /// Raw code passed to the driver.
    #[must_use]
    pub const fn code(self) -> i16 {
        self as i16
    }
}

/// Parameter direction (`SQL_PARAM_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i16)]
pub enum ParamDirection {
    /// `SQL_PARAM_INPUT`.
    #[default]
    Input = 1,
    /// `SQL_PARAM_INPUT_OUTPUT`.
    InputOutput = 2,
    /// `SQL_PARAM_OUTPUT`.
    Output = 4,
}

impl ParamDirection {
    /// Raw code passed to the driver.
    #[must_use]
    pub const fn code(self) -> i16 {
        self as i16
    }

    /// Whether the driver writes a value back into the buffer.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Output | Self::InputOutput)
    }
}

/// The value family that produced a binding.
///
/// Recorded at bind time and used only to pick a decode routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DynamicKind {
    /// NULL, table-valued parameters and anything without a decoder.
    #[default]
    Null,
    /// Text.
    String,
    /// Boolean.
    Boolean,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Generic number (64-bit integer, double or decimal storage).
    Number,
    /// Date or time.
    Date,
    /// Byte sequence.
    Buffer,
}
