//! Typed access to one message buffer.
//!
//! A `Message` owns the bytes of one row or parameter set and interprets
//! them through a shared `MessageLayout`. Each setter takes
//! `impl Into<Option<T>>`: `None` marks the slot null, a value is converted
//! to the slot's adjusted type, written, and only then is the null flag
//! cleared. Getters return `Ok(None)` for null slots without touching the
//! value bytes.
//!
//! ```
//! use firebird_marshal::{Message, MessageLayout, OriginalType};
//!
//! let layout = MessageLayout::builder()
//!     .with_nullable_column(OriginalType::Int64, -2, 8)
//!     .with_nullable_column(OriginalType::Varying, 0, 20)
//!     .build()?
//!     .into_shared();
//!
//! let mut message = Message::new(layout);
//! message.set_string(0, "12.345")?;
//! message.set_string(1, "hello")?;
//!
//! assert_eq!(message.get_i64(0)?, Some(12));
//! assert_eq!(message.get_string(0)?, Some("12.35".to_string()));
//! assert_eq!(message.get_string(1)?, Some("hello".to_string()));
//! # Ok::<(), firebird_marshal::Error>(())
//! ```

mod calendar;
mod generic;
mod numeric;
mod text;

pub use generic::{FromColumn, FromMessage, FromRow, ToMessage, ToRow};

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::buffer::MessageBuffer;
use crate::protocol::constants::{NULL_FLAG_FALSE, NULL_FLAG_TRUE};
use crate::protocol::convert::CalendarConverter;
use crate::protocol::layout::MessageLayout;
use crate::protocol::types::{AdjustedType, BlobId, Descriptor, Value};
use crate::protocol::util::{EngineUtil, StandardEngineUtil};

/// Values of one row or parameter set.
#[derive(Clone)]
pub struct Message {
    layout: Arc<MessageLayout>,
    util: Arc<dyn EngineUtil>,
    buffer: MessageBuffer,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("layout", &self.layout)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl Message {
    /// Create a message with every slot null, using `StandardEngineUtil`.
    pub fn new(layout: Arc<MessageLayout>) -> Self {
        Self::with_util(layout, Arc::new(StandardEngineUtil::new()))
    }

    /// Create a message with every slot null.
    pub fn with_util(layout: Arc<MessageLayout>, util: Arc<dyn EngineUtil>) -> Self {
        let buffer = MessageBuffer::new(layout.length());
        let mut message = Self {
            layout,
            util,
            buffer,
        };
        message.clear();
        message
    }

    /// Wrap bytes fetched from the engine, using `StandardEngineUtil`.
    pub fn from_bytes(layout: Arc<MessageLayout>, bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_util(layout, Arc::new(StandardEngineUtil::new()), bytes)
    }

    /// Wrap bytes fetched from the engine.
    ///
    /// Returns error if `bytes` is not exactly the layout's length.
    pub fn from_bytes_with_util(
        layout: Arc<MessageLayout>,
        util: Arc<dyn EngineUtil>,
        bytes: &[u8],
    ) -> Result<Self> {
        if bytes.len() != layout.length() {
            return Err(Error::invalid_layout(format!(
                "message is {} bytes, layout expects {}",
                bytes.len(),
                layout.length()
            )));
        }
        Ok(Self {
            layout,
            util,
            buffer: MessageBuffer::from_bytes(bytes),
        })
    }

    pub fn layout(&self) -> &Arc<MessageLayout> {
        &self.layout
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        self.layout.descriptors()
    }

    /// Get a descriptor by index.
    pub fn descriptor(&self, index: usize) -> Result<&Descriptor> {
        self.layout.descriptor(index)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.layout.count()
    }

    /// Check if the message has no columns.
    pub fn is_empty(&self) -> bool {
        self.layout.count() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Calendar converter bound to this message's engine utility.
    pub fn calendar(&self) -> CalendarConverter<'_> {
        CalendarConverter::new(self.util.as_ref())
    }

    fn null_flag(&self, desc: &Descriptor) -> Result<bool> {
        Ok(self.buffer.read_i16_le(desc.null_offset as usize)? != NULL_FLAG_FALSE)
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        let desc = self.layout.descriptor(index)?;
        self.null_flag(desc)
    }

    /// Mark a slot null. Its value bytes are left as they are.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        let desc = self.layout.descriptor(index)?;
        self.buffer
            .write_i16_le(desc.null_offset as usize, NULL_FLAG_TRUE)?;
        tracing::trace!(index, "slot set null");
        Ok(())
    }

    /// Mark every slot null.
    pub fn clear(&mut self) {
        for desc in self.layout.descriptors() {
            // offsets were validated against the buffer length by MessageLayout::new
            let _ = self
                .buffer
                .write_i16_le(desc.null_offset as usize, NULL_FLAG_TRUE);
        }
    }

    /// Decode a non-null slot with `read`.
    fn read_value<T, F>(&self, index: usize, read: F) -> Result<Option<T>>
    where
        F: FnOnce(&Descriptor, CalendarConverter<'_>, &MessageBuffer) -> Result<T>,
    {
        let desc = self.layout.descriptor(index)?;
        if self.null_flag(desc)? {
            return Ok(None);
        }
        let converter = CalendarConverter::new(self.util.as_ref());
        match read(desc, converter, &self.buffer) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(
                    index,
                    adjusted_type = %desc.adjusted_type,
                    error = %e,
                    "slot read failed"
                );
                Err(e)
            }
        }
    }

    /// Encode a value with `write`, then clear the null flag. A failed
    /// write leaves the slot null.
    fn write_value<F>(&mut self, index: usize, write: F) -> Result<()>
    where
        F: FnOnce(&Descriptor, CalendarConverter<'_>, &mut MessageBuffer) -> Result<()>,
    {
        let desc = self.layout.descriptor(index)?;
        let null_offset = desc.null_offset as usize;
        let converter = CalendarConverter::new(self.util.as_ref());

        match write(desc, converter, &mut self.buffer) {
            Ok(()) => {
                self.buffer.write_i16_le(null_offset, NULL_FLAG_FALSE)?;
                tracing::trace!(index, adjusted_type = %desc.adjusted_type, "slot written");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    index,
                    adjusted_type = %desc.adjusted_type,
                    error = %e,
                    "slot write failed"
                );
                self.buffer.write_i16_le(null_offset, NULL_FLAG_TRUE)?;
                Err(e)
            }
        }
    }

    // --- BOOLEAN ---

    pub fn get_bool(&self, index: usize) -> Result<Option<bool>> {
        self.read_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::Boolean => Ok(buf.read_u8(desc.offset as usize)? != 0),
            other => Err(Error::invalid_type("bool", other)),
        })
    }

    pub fn set_bool(&mut self, index: usize, value: impl Into<Option<bool>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::Boolean => buf.write_u8(desc.offset as usize, value as u8),
            other => Err(Error::invalid_type("bool", other)),
        })
    }

    // --- BLOB ---

    pub fn get_blob_id(&self, index: usize) -> Result<Option<BlobId>> {
        self.read_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::Blob => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(buf.read_bytes(desc.offset as usize, 8)?);
                Ok(BlobId::from_bytes(bytes))
            }
            other => Err(Error::invalid_type("BlobId", other)),
        })
    }

    pub fn set_blob_id(&mut self, index: usize, value: impl Into<Option<BlobId>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::Blob => buf.write_bytes(desc.offset as usize, &value.to_bytes()),
            other => Err(Error::invalid_type("BlobId", other)),
        })
    }

    // --- dynamic ---

    /// Decode a slot by its adjusted type.
    pub fn get_value(&self, index: usize) -> Result<Value> {
        let desc = self.layout.descriptor(index)?;
        let value = match desc.adjusted_type {
            AdjustedType::Null => return Ok(Value::Null),
            AdjustedType::Boolean => self.get_bool(index)?.map(Value::Boolean),
            AdjustedType::Int16 => self.get_scaled_i16(index)?.map(Value::Int16),
            AdjustedType::Int32 => self.get_scaled_i32(index)?.map(Value::Int32),
            AdjustedType::Int64 => self.get_scaled_i64(index)?.map(Value::Int64),
            AdjustedType::Int128 => self.get_scaled_i128(index)?.map(Value::Int128),
            AdjustedType::Float => self.get_f32(index)?.map(Value::Float),
            AdjustedType::Double => self.get_f64(index)?.map(Value::Double),
            AdjustedType::DecFloat16 => self.get_decfloat16(index)?.map(Value::DecFloat16),
            AdjustedType::DecFloat34 => self.get_decfloat34(index)?.map(Value::DecFloat34),
            AdjustedType::String | AdjustedType::Text => {
                self.get_string(index)?.map(Value::String)
            }
            AdjustedType::Date => self.get_date(index)?.map(Value::Date),
            AdjustedType::Time => self.get_time(index)?.map(Value::Time),
            AdjustedType::Timestamp => self.get_timestamp(index)?.map(Value::Timestamp),
            AdjustedType::TimeTz | AdjustedType::TimeTzEx => {
                self.get_time_tz(index)?.map(Value::TimeTz)
            }
            AdjustedType::TimestampTz | AdjustedType::TimestampTzEx => {
                self.get_timestamp_tz(index)?.map(Value::TimestampTz)
            }
            AdjustedType::Blob => self.get_blob_id(index)?.map(Value::Blob),
        };
        Ok(value.unwrap_or(Value::Null))
    }

    /// Decode every slot.
    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.len()).map(|index| self.get_value(index)).collect()
    }

    /// Read a value of any type implementing `FromMessage`.
    pub fn get<T: FromMessage>(&self, index: usize) -> Result<Option<T>> {
        T::from_message(self, index)
    }

    /// Write a value of any type implementing `ToMessage`.
    pub fn set<T: ToMessage>(&mut self, index: usize, value: T) -> Result<()> {
        value.to_message(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::OriginalType;

    fn layout() -> Arc<MessageLayout> {
        MessageLayout::builder()
            .with_nullable_column(OriginalType::Boolean, 0, 1)
            .with_nullable_column(OriginalType::Long, 0, 4)
            .with_nullable_column(OriginalType::Blob, 0, 8)
            .with_nullable_column(OriginalType::Null, 0, 0)
            .build()
            .unwrap()
            .into_shared()
    }

    #[test]
    fn test_new_message_all_null() {
        let message = Message::new(layout());
        assert_eq!(message.len(), 4);
        for index in 0..message.len() {
            assert!(message.is_null(index).unwrap());
            assert_eq!(message.get_value(index).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_bool_round_trip() {
        let mut message = Message::new(layout());
        message.set_bool(0, true).unwrap();
        assert_eq!(message.get_bool(0).unwrap(), Some(true));
        message.set_bool(0, false).unwrap();
        assert_eq!(message.get_bool(0).unwrap(), Some(false));
        message.set_bool(0, None).unwrap();
        assert_eq!(message.get_bool(0).unwrap(), None);
    }

    #[test]
    fn test_get_bool_on_int32_slot() {
        let mut message = Message::new(layout());
        message.set_i32(1, 7).unwrap();
        let before = message.as_bytes().to_vec();
        assert_eq!(
            message.get_bool(1),
            Err(Error::InvalidType {
                requested: "bool",
                actual: AdjustedType::Int32
            })
        );
        assert_eq!(message.as_bytes(), &before[..]);
    }

    #[test]
    fn test_failed_write_leaves_slot_null() {
        let mut message = Message::new(layout());
        message.set_i32(1, 7).unwrap();
        assert!(message.set_bool(1, true).is_err());
        assert!(message.is_null(1).unwrap());
    }

    #[test]
    fn test_blob_id() {
        let mut message = Message::new(layout());
        message.set_blob_id(2, BlobId::new(3, 4)).unwrap();
        assert_eq!(message.get_blob_id(2).unwrap(), Some(BlobId::new(3, 4)));
        assert_eq!(message.get_value(2).unwrap(), Value::Blob(BlobId::new(3, 4)));
        assert_eq!(message.get_blob_id(0).unwrap(), None);
        assert!(matches!(
            message.set_blob_id(1, BlobId::default()),
            Err(Error::InvalidType { requested: "BlobId", .. })
        ));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let mut message = Message::new(layout());
        assert_eq!(
            message.is_null(4),
            Err(Error::IndexOutOfBounds { index: 4, count: 4 })
        );
        assert!(message.set_i32(9, 1).is_err());
    }

    #[test]
    fn test_from_bytes_length_mismatch() {
        let layout = layout();
        let len = layout.length();
        assert!(Message::from_bytes(layout.clone(), &vec![0; len]).is_ok());
        assert!(matches!(
            Message::from_bytes(layout, &vec![0; len + 1]),
            Err(Error::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut message = Message::new(layout());
        message.set_bool(0, true).unwrap();
        message.set_i32(1, 1).unwrap();
        message.clear();
        assert!(message.is_null(0).unwrap());
        assert!(message.is_null(1).unwrap());
    }
}
