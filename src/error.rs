//! Error types for message marshaling.

use std::panic::Location;
use thiserror::Error;

use crate::protocol::types::AdjustedType;
use crate::protocol::util::EngineStatus;

/// Result type alias for marshaling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for message marshaling operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Numeric value does not fit the destination type.
    #[error(
        "Arithmetic exception, numeric overflow, or string truncation: \
         numeric value is out of range"
    )]
    NumericRange,

    /// Date is not a valid proleptic Gregorian calendar date.
    #[error("Invalid date")]
    InvalidDate,

    /// Time of day is out of range or not representable in engine ticks.
    #[error("Invalid time")]
    InvalidTime,

    /// Timestamp is out of range or not representable in engine ticks.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Text could not be parsed as the requested type.
    #[error("Conversion error from string \"{value}\"")]
    ConversionErrorFromString { value: String },

    /// Accessor type does not match the descriptor's adjusted type.
    #[error("Invalid type: actual type {requested}, descriptor type {actual}")]
    InvalidType {
        requested: &'static str,
        actual: AdjustedType,
    },

    /// String longer than the slot's declared length.
    #[error(
        "Arithmetic exception, numeric overflow, or string truncation: \
         string right truncation (length {length}, maximum {max_length})"
    )]
    StringTruncation { length: usize, max_length: u32 },

    /// Column or parameter index out of bounds.
    #[error("Index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// NULL read into a row field that is not an `Option`.
    #[error("Column {index} is NULL but the row field is not optional")]
    UnexpectedNull { index: usize },

    /// Row type and message disagree on the number of columns.
    #[error("Row has {fields} fields but the message has {columns} columns")]
    FieldCountMismatch { fields: usize, columns: usize },

    /// Unsupported SQL type code.
    #[error("Unsupported SQL data type: {type_num}")]
    UnsupportedType { type_num: u32 },

    /// Buffer too small.
    #[error("Buffer too small: need {needed} bytes, have {available}, failed at {location}")]
    BufferTooSmall {
        needed: usize,
        available: usize,
        location: &'static Location<'static>,
    },

    /// Descriptors inconsistent with the message they describe.
    #[error("Invalid message layout: {message}")]
    InvalidLayout { message: String },

    /// Failure reported by the engine utility, passed through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineStatus),
}

impl Error {
    /// Create a conversion error for the given text.
    pub fn conversion_from_string(value: impl Into<String>) -> Self {
        Self::ConversionErrorFromString {
            value: value.into(),
        }
    }

    /// Create an invalid type error.
    pub fn invalid_type(requested: &'static str, actual: AdjustedType) -> Self {
        Self::InvalidType { requested, actual }
    }

    /// Create an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }
}
