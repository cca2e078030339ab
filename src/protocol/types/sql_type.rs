//! SQL type codes as reported by the engine, and the canonical types the
//! accessors dispatch on.
//!
//! Nullability is a descriptor property; the nullable bit of a raw type code
//! is stripped on decode.

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::constants::{
    SQL_BLOB, SQL_BOOLEAN, SQL_DEC16, SQL_DEC34, SQL_DOUBLE, SQL_FLOAT, SQL_INT128, SQL_INT64,
    SQL_LONG, SQL_NULL, SQL_NULLABLE_FLAG, SQL_SHORT, SQL_TEXT, SQL_TIMESTAMP, SQL_TIMESTAMP_TZ,
    SQL_TIMESTAMP_TZ_EX, SQL_TIME_TZ, SQL_TIME_TZ_EX, SQL_TYPE_DATE, SQL_TYPE_TIME, SQL_VARYING,
};

/// Wire-level SQL type of a column or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginalType {
    Null,
    /// CHAR(n) - fixed-length text.
    Text,
    /// VARCHAR(n) - length-prefixed text.
    Varying,
    Short,
    Long,
    Float,
    Double,
    Timestamp,
    Blob,
    Time,
    Date,
    Int64,
    TimestampTz,
    /// TIMESTAMP WITH TIME ZONE carrying the zone's offset in the message.
    TimestampTzEx,
    TimeTz,
    /// TIME WITH TIME ZONE carrying the zone's offset in the message.
    TimeTzEx,
    Int128,
    /// DECFLOAT(16)
    Dec16,
    /// DECFLOAT(34)
    Dec34,
    Boolean,
}

impl OriginalType {
    /// Create from a raw SQL type code.
    ///
    /// Returns `Err(Error::UnsupportedType)` for unknown codes.
    pub fn from_raw(type_num: u32) -> Result<Self> {
        match type_num & !SQL_NULLABLE_FLAG {
            SQL_NULL => Ok(OriginalType::Null),
            SQL_TEXT => Ok(OriginalType::Text),
            SQL_VARYING => Ok(OriginalType::Varying),
            SQL_SHORT => Ok(OriginalType::Short),
            SQL_LONG => Ok(OriginalType::Long),
            SQL_FLOAT => Ok(OriginalType::Float),
            SQL_DOUBLE => Ok(OriginalType::Double),
            SQL_TIMESTAMP => Ok(OriginalType::Timestamp),
            SQL_BLOB => Ok(OriginalType::Blob),
            SQL_TYPE_TIME => Ok(OriginalType::Time),
            SQL_TYPE_DATE => Ok(OriginalType::Date),
            SQL_INT64 => Ok(OriginalType::Int64),
            SQL_TIMESTAMP_TZ => Ok(OriginalType::TimestampTz),
            SQL_TIMESTAMP_TZ_EX => Ok(OriginalType::TimestampTzEx),
            SQL_TIME_TZ => Ok(OriginalType::TimeTz),
            SQL_TIME_TZ_EX => Ok(OriginalType::TimeTzEx),
            SQL_INT128 => Ok(OriginalType::Int128),
            SQL_DEC16 => Ok(OriginalType::Dec16),
            SQL_DEC34 => Ok(OriginalType::Dec34),
            SQL_BOOLEAN => Ok(OriginalType::Boolean),
            _ => Err(Error::UnsupportedType { type_num }),
        }
    }

    /// Get the SQL type code (without the nullable bit).
    pub fn type_num(&self) -> u32 {
        match self {
            OriginalType::Null => SQL_NULL,
            OriginalType::Text => SQL_TEXT,
            OriginalType::Varying => SQL_VARYING,
            OriginalType::Short => SQL_SHORT,
            OriginalType::Long => SQL_LONG,
            OriginalType::Float => SQL_FLOAT,
            OriginalType::Double => SQL_DOUBLE,
            OriginalType::Timestamp => SQL_TIMESTAMP,
            OriginalType::Blob => SQL_BLOB,
            OriginalType::Time => SQL_TYPE_TIME,
            OriginalType::Date => SQL_TYPE_DATE,
            OriginalType::Int64 => SQL_INT64,
            OriginalType::TimestampTz => SQL_TIMESTAMP_TZ,
            OriginalType::TimestampTzEx => SQL_TIMESTAMP_TZ_EX,
            OriginalType::TimeTz => SQL_TIME_TZ,
            OriginalType::TimeTzEx => SQL_TIME_TZ_EX,
            OriginalType::Int128 => SQL_INT128,
            OriginalType::Dec16 => SQL_DEC16,
            OriginalType::Dec34 => SQL_DEC34,
            OriginalType::Boolean => SQL_BOOLEAN,
        }
    }

    /// Canonical type used for accessor dispatch.
    pub fn adjusted(&self) -> AdjustedType {
        match self {
            OriginalType::Null => AdjustedType::Null,
            OriginalType::Text => AdjustedType::Text,
            OriginalType::Varying => AdjustedType::String,
            OriginalType::Short => AdjustedType::Int16,
            OriginalType::Long => AdjustedType::Int32,
            OriginalType::Float => AdjustedType::Float,
            OriginalType::Double => AdjustedType::Double,
            OriginalType::Timestamp => AdjustedType::Timestamp,
            OriginalType::Blob => AdjustedType::Blob,
            OriginalType::Time => AdjustedType::Time,
            OriginalType::Date => AdjustedType::Date,
            OriginalType::Int64 => AdjustedType::Int64,
            OriginalType::TimestampTz => AdjustedType::TimestampTz,
            OriginalType::TimestampTzEx => AdjustedType::TimestampTzEx,
            OriginalType::TimeTz => AdjustedType::TimeTz,
            OriginalType::TimeTzEx => AdjustedType::TimeTzEx,
            OriginalType::Int128 => AdjustedType::Int128,
            OriginalType::Dec16 => AdjustedType::DecFloat16,
            OriginalType::Dec34 => AdjustedType::DecFloat34,
            OriginalType::Boolean => AdjustedType::Boolean,
        }
    }

    /// Whether the type has a declared length (character types).
    pub fn has_length(&self) -> bool {
        matches!(self, OriginalType::Text | OriginalType::Varying)
    }
}

impl fmt::Display for OriginalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginalType::Null => write!(f, "NULL"),
            OriginalType::Text => write!(f, "CHAR"),
            OriginalType::Varying => write!(f, "VARCHAR"),
            OriginalType::Short => write!(f, "SMALLINT"),
            OriginalType::Long => write!(f, "INTEGER"),
            OriginalType::Float => write!(f, "FLOAT"),
            OriginalType::Double => write!(f, "DOUBLE PRECISION"),
            OriginalType::Timestamp => write!(f, "TIMESTAMP"),
            OriginalType::Blob => write!(f, "BLOB"),
            OriginalType::Time => write!(f, "TIME"),
            OriginalType::Date => write!(f, "DATE"),
            OriginalType::Int64 => write!(f, "BIGINT"),
            OriginalType::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            OriginalType::TimestampTzEx => write!(f, "TIMESTAMP WITH TIME ZONE (EX)"),
            OriginalType::TimeTz => write!(f, "TIME WITH TIME ZONE"),
            OriginalType::TimeTzEx => write!(f, "TIME WITH TIME ZONE (EX)"),
            OriginalType::Int128 => write!(f, "INT128"),
            OriginalType::Dec16 => write!(f, "DECFLOAT(16)"),
            OriginalType::Dec34 => write!(f, "DECFLOAT(34)"),
            OriginalType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Canonical type selecting the conversion used by an accessor.
///
/// The byte layout of a value slot is a function of this type alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustedType {
    Null,
    /// Length-prefixed text (VARYING layout).
    String,
    /// Fixed-width, space-padded text (CHAR layout) as reported by the
    /// engine, before the client coerces it to `String`.
    Text,
    Int16,
    Int32,
    Float,
    Double,
    Timestamp,
    Blob,
    Time,
    Date,
    Int64,
    TimestampTz,
    TimestampTzEx,
    TimeTz,
    TimeTzEx,
    Int128,
    DecFloat16,
    DecFloat34,
    Boolean,
}

impl AdjustedType {
    /// Engine type code of the slot layout this type denotes.
    ///
    pub fn type_num(&self) -> u32 {
        match self {
            AdjustedType::Null => SQL_NULL,
            AdjustedType::String => SQL_VARYING,
            AdjustedType::Text => SQL_TEXT,
            AdjustedType::Int16 => SQL_SHORT,
            AdjustedType::Int32 => SQL_LONG,
            AdjustedType::Float => SQL_FLOAT,
            AdjustedType::Double => SQL_DOUBLE,
            AdjustedType::Timestamp => SQL_TIMESTAMP,
            AdjustedType::Blob => SQL_BLOB,
            AdjustedType::Time => SQL_TYPE_TIME,
            AdjustedType::Date => SQL_TYPE_DATE,
            AdjustedType::Int64 => SQL_INT64,
            AdjustedType::TimestampTz => SQL_TIMESTAMP_TZ,
            AdjustedType::TimestampTzEx => SQL_TIMESTAMP_TZ_EX,
            AdjustedType::TimeTz => SQL_TIME_TZ,
            AdjustedType::TimeTzEx => SQL_TIME_TZ_EX,
            AdjustedType::Int128 => SQL_INT128,
            AdjustedType::DecFloat16 => SQL_DEC16,
            AdjustedType::DecFloat34 => SQL_DEC34,
            AdjustedType::Boolean => SQL_BOOLEAN,
        }
    }

    /// Exact numeric types, where the descriptor scale applies.
    pub fn is_exact_numeric(&self) -> bool {
        matches!(
            self,
            AdjustedType::Int16 | AdjustedType::Int32 | AdjustedType::Int64 | AdjustedType::Int128
        )
    }

    /// Any type the numeric accessors accept.
    pub fn is_numeric(&self) -> bool {
        self.is_exact_numeric()
            || matches!(
                self,
                AdjustedType::Float
                    | AdjustedType::Double
                    | AdjustedType::DecFloat16
                    | AdjustedType::DecFloat34
            )
    }
}

impl fmt::Display for AdjustedType {
    /// Displays the engine type code, as in engine diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_num())
    }
}
