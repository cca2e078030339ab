//! Message layout: where each column's value and null flag live.
//!
//! Widths and alignments follow the engine's client ABI; they are versioned
//! by `LAYOUT_VERSION`.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::protocol::constants::NULL_FLAG_SIZE;
use crate::protocol::types::{AdjustedType, Descriptor, OriginalType};

/// Bytes a value of `original_type` with declared `length` occupies.
pub fn type_width(original_type: OriginalType, length: u32) -> usize {
    match original_type {
        OriginalType::Null => 0,
        OriginalType::Text => length as usize,
        OriginalType::Varying => length as usize + 2,
        OriginalType::Boolean => 1,
        OriginalType::Short => 2,
        OriginalType::Long | OriginalType::Float | OriginalType::Time | OriginalType::Date => 4,
        OriginalType::Double
        | OriginalType::Timestamp
        | OriginalType::Blob
        | OriginalType::Int64
        | OriginalType::Dec16
        | OriginalType::TimeTz
        | OriginalType::TimeTzEx => 8,
        OriginalType::TimestampTz | OriginalType::TimestampTzEx => 12,
        OriginalType::Int128 | OriginalType::Dec34 => 16,
    }
}

/// Required alignment of a value of `original_type`.
pub fn type_alignment(original_type: OriginalType) -> usize {
    match original_type {
        OriginalType::Null | OriginalType::Text | OriginalType::Boolean => 1,
        OriginalType::Varying | OriginalType::Short => 2,
        OriginalType::Long
        | OriginalType::Float
        | OriginalType::Time
        | OriginalType::Date
        | OriginalType::Timestamp
        | OriginalType::Blob
        | OriginalType::TimeTz
        | OriginalType::TimeTzEx
        | OriginalType::TimestampTz
        | OriginalType::TimestampTzEx => 4,
        OriginalType::Double
        | OriginalType::Int64
        | OriginalType::Int128
        | OriginalType::Dec16
        | OriginalType::Dec34 => 8,
    }
}

/// Type the client rewrites a column to before binding.
fn coerced(original_type: OriginalType) -> OriginalType {
    match original_type {
        OriginalType::Text => OriginalType::Varying,
        OriginalType::TimeTzEx => OriginalType::TimeTz,
        OriginalType::TimestampTzEx => OriginalType::TimestampTz,
        other => other,
    }
}

/// Bytes a slot of `adjusted_type` occupies, for bounds validation.
fn slot_width(adjusted_type: AdjustedType, length: u32) -> usize {
    match adjusted_type {
        AdjustedType::Null => 0,
        AdjustedType::String => length as usize + 2,
        AdjustedType::Text => length as usize,
        AdjustedType::Boolean => 1,
        AdjustedType::Int16 => 2,
        AdjustedType::Int32 | AdjustedType::Float | AdjustedType::Time | AdjustedType::Date => 4,
        AdjustedType::Double
        | AdjustedType::Timestamp
        | AdjustedType::Blob
        | AdjustedType::Int64
        | AdjustedType::DecFloat16
        | AdjustedType::TimeTz
        | AdjustedType::TimeTzEx => 8,
        AdjustedType::TimestampTz | AdjustedType::TimestampTzEx => 12,
        AdjustedType::Int128 | AdjustedType::DecFloat34 => 16,
    }
}

fn align(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) / alignment * alignment
}

/// Descriptors of every column in a message, plus the message length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLayout {
    descriptors: Vec<Descriptor>,
    length: usize,
}

impl MessageLayout {
    /// Create a layout from descriptors reported by the engine.
    ///
    /// Returns error if any value slot or null flag lies outside `length`.
    pub fn new(descriptors: Vec<Descriptor>, length: usize) -> Result<Self> {
        for (index, desc) in descriptors.iter().enumerate() {
            let value_end = desc.offset as usize + slot_width(desc.adjusted_type, desc.length);
            if value_end > length {
                return Err(Error::invalid_layout(format!(
                    "column {} value ends at {} past message length {}",
                    index, value_end, length
                )));
            }
            let null_end = desc.null_offset as usize + NULL_FLAG_SIZE;
            if null_end > length {
                return Err(Error::invalid_layout(format!(
                    "column {} null flag ends at {} past message length {}",
                    index, null_end, length
                )));
            }
        }

        tracing::trace!(columns = descriptors.len(), length, "message layout");
        Ok(Self {
            descriptors,
            length,
        })
    }

    /// Start building a layout column by column.
    pub fn builder() -> MessageLayoutBuilder {
        MessageLayoutBuilder::new()
    }

    /// Wrap in an `Arc` for sharing between messages.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Get a descriptor by index.
    pub fn descriptor(&self, index: usize) -> Result<&Descriptor> {
        self.descriptors.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            count: self.descriptors.len(),
        })
    }

    /// Number of columns.
    pub fn count(&self) -> usize {
        self.descriptors.len()
    }

    /// Message length in bytes.
    pub fn length(&self) -> usize {
        self.length
    }
}

#[derive(Debug, Clone)]
struct ColumnSpec {
    original_type: OriginalType,
    scale: i32,
    length: u32,
    nullable: bool,
}

/// Builder computing offsets the way the client does when preparing a
/// statement.
#[derive(Debug, Clone, Default)]
pub struct MessageLayoutBuilder {
    columns: Vec<ColumnSpec>,
}

impl MessageLayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a NOT NULL column.
    ///
    /// `length` is the declared byte length for TEXT/VARYING and ignored
    /// for fixed-width types.
    pub fn with_column(mut self, original_type: OriginalType, scale: i32, length: u32) -> Self {
        self.columns.push(ColumnSpec {
            original_type,
            scale,
            length,
            nullable: false,
        });
        self
    }

    /// Add a nullable column.
    pub fn with_nullable_column(
        mut self,
        original_type: OriginalType,
        scale: i32,
        length: u32,
    ) -> Self {
        self.columns.push(ColumnSpec {
            original_type,
            scale,
            length,
            nullable: true,
        });
        self
    }

    /// Add a column from a raw type code; the nullable bit sets nullability.
    pub fn with_raw_column(self, type_num: u32, scale: i32, length: u32) -> Result<Self> {
        let original_type = OriginalType::from_raw(type_num)?;
        let nullable = type_num & crate::protocol::constants::SQL_NULLABLE_FLAG != 0;
        Ok(if nullable {
            self.with_nullable_column(original_type, scale, length)
        } else {
            self.with_column(original_type, scale, length)
        })
    }

    /// Compute offsets and produce the layout.
    pub fn build(self) -> Result<MessageLayout> {
        let mut offset = 0usize;
        let mut descriptors = Vec::with_capacity(self.columns.len());

        for column in self.columns {
            let slot_type = coerced(column.original_type);
            let length = if slot_type.has_length() {
                column.length
            } else {
                type_width(slot_type, 0) as u32
            };

            offset = align(offset, type_alignment(slot_type));
            let value_offset = offset;
            offset += type_width(slot_type, length);

            offset = align(offset, NULL_FLAG_SIZE);
            let null_offset = offset;
            offset += NULL_FLAG_SIZE;

            let to_u32 = |value: usize| {
                u32::try_from(value)
                    .map_err(|_| Error::invalid_layout("message longer than 4 GiB"))
            };
            descriptors.push(
                Descriptor::new(
                    column.original_type,
                    column.scale,
                    length,
                    to_u32(value_offset)?,
                    to_u32(null_offset)?,
                    column.nullable,
                )
                .with_adjusted_type(slot_type.adjusted()),
            );
        }

        MessageLayout::new(descriptors, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_and_alignment() {
        let layout = MessageLayoutBuilder::new()
            .with_column(OriginalType::Short, 0, 2)
            .with_nullable_column(OriginalType::Int64, -2, 8)
            .with_column(OriginalType::Boolean, 0, 1)
            .with_nullable_column(OriginalType::Varying, 0, 5)
            .build()
            .unwrap();

        let offsets: Vec<(u32, u32)> = layout
            .descriptors()
            .iter()
            .map(|d| (d.offset, d.null_offset))
            .collect();
        // SHORT 0..2, null 2; INT64 8..16, null 16; BOOLEAN 18, null 20;
        // VARYING 22..29, null 30
        assert_eq!(offsets, vec![(0, 2), (8, 16), (18, 20), (22, 30)]);
        assert_eq!(layout.length(), 32);
        assert_eq!(layout.descriptor(1).unwrap().scale, -2);
    }

    #[test]
    fn test_text_coerced_to_varying() {
        let layout = MessageLayoutBuilder::new()
            .with_column(OriginalType::Text, 0, 3)
            .with_column(OriginalType::TimeTzEx, 0, 0)
            .with_column(OriginalType::TimestampTzEx, 0, 0)
            .build()
            .unwrap();

        let text = layout.descriptor(0).unwrap();
        assert_eq!(text.original_type, OriginalType::Text);
        assert_eq!(text.adjusted_type, AdjustedType::String);
        assert_eq!((text.offset, text.null_offset), (0, 6));

        let time = layout.descriptor(1).unwrap();
        assert_eq!(time.adjusted_type, AdjustedType::TimeTz);
        assert_eq!((time.offset, time.null_offset, time.length), (8, 16, 8));

        let timestamp = layout.descriptor(2).unwrap();
        assert_eq!(timestamp.adjusted_type, AdjustedType::TimestampTz);
        assert_eq!((timestamp.offset, timestamp.null_offset), (20, 32));
        assert_eq!(layout.length(), 34);
    }

    #[test]
    fn test_raw_column_nullable_bit() {
        let layout = MessageLayoutBuilder::new()
            .with_raw_column(crate::protocol::constants::SQL_LONG | 1, 0, 4)
            .unwrap()
            .build()
            .unwrap();
        assert!(layout.descriptor(0).unwrap().nullable);
        assert!(MessageLayoutBuilder::new().with_raw_column(9999, 0, 0).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let desc = Descriptor::new(OriginalType::Long, 0, 4, 4, 8, true);
        assert!(MessageLayout::new(vec![desc.clone()], 10).is_ok());
        assert!(matches!(
            MessageLayout::new(vec![desc], 9),
            Err(Error::InvalidLayout { .. })
        ));
        let desc = Descriptor::new(OriginalType::Int128, 0, 16, 8, 0, true);
        assert!(matches!(
            MessageLayout::new(vec![desc], 16),
            Err(Error::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let layout = MessageLayoutBuilder::new().build().unwrap();
        assert_eq!(layout.length(), 0);
        assert_eq!(
            layout.descriptor(0),
            Err(Error::IndexOutOfBounds { index: 0, count: 0 })
        );
    }
}
