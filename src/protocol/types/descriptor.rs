//! Per-column metadata describing where a value lives in a message.
//!
//! Descriptors are produced once, when a statement is prepared (or by
//! `MessageLayoutBuilder`), and never change afterwards.

use crate::error::Result;

use super::sql_type::{AdjustedType, OriginalType};

/// Binary encoding of one column or parameter within a message buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// SQL type reported by the engine.
    pub original_type: OriginalType,
    /// Type used to select the conversion; determines the slot layout.
    pub adjusted_type: AdjustedType,
    /// Decimal scale (value = stored integer * 10^scale).
    pub scale: i32,
    /// Declared length in bytes (character data length for strings).
    pub length: u32,
    /// Byte offset of the value slot.
    pub offset: u32,
    /// Byte offset of the 2-byte null flag.
    pub null_offset: u32,
    /// Whether NULL values are allowed.
    pub nullable: bool,
}

impl Descriptor {
    /// Create a descriptor whose adjusted type follows from the original type.
    pub fn new(
        original_type: OriginalType,
        scale: i32,
        length: u32,
        offset: u32,
        null_offset: u32,
        nullable: bool,
    ) -> Self {
        Self {
            original_type,
            adjusted_type: original_type.adjusted(),
            scale,
            length,
            offset,
            null_offset,
            nullable,
        }
    }

    /// Create a descriptor from a raw type code as reported by the engine.
    ///
    /// Returns error if the type code is not supported.
    pub fn from_raw(
        type_num: u32,
        scale: i32,
        length: u32,
        offset: u32,
        null_offset: u32,
        nullable: bool,
    ) -> Result<Self> {
        Ok(Self::new(
            OriginalType::from_raw(type_num)?,
            scale,
            length,
            offset,
            null_offset,
            nullable,
        ))
    }

    /// Override the adjusted type, for slots the client coerces.
    pub fn with_adjusted_type(mut self, adjusted_type: AdjustedType) -> Self {
        self.adjusted_type = adjusted_type;
        self
    }
}
