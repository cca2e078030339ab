//! Fixed-size byte region holding one message's values and null flags.
//!
//! All multi-byte values are little-endian. Every access is bounds-checked
//! against the buffer length and reports the caller's location on failure.

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};

/// Offset-addressed little-endian buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBuffer {
    data: BytesMut,
}

macro_rules! le_accessors {
    ($($read:ident, $write:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Read a little-endian `", stringify!($ty), "` at `offset`.")]
            #[track_caller]
            pub fn $read(&self, offset: usize) -> Result<$ty> {
                Ok(<$ty>::from_le_bytes(self.read_array(offset)?))
            }

            #[doc = concat!("Write a little-endian `", stringify!($ty), "` at `offset`.")]
            #[track_caller]
            pub fn $write(&mut self, offset: usize, val: $ty) -> Result<()> {
                self.write_bytes(offset, &val.to_le_bytes())
            }
        )*
    };
}

impl MessageBuffer {
    /// Create a zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            data: BytesMut::zeroed(len),
        }
    }

    /// Wrap existing message bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Freeze into immutable bytes.
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    #[track_caller]
    fn check(&self, offset: usize, n: usize) -> Result<()> {
        match offset.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(Error::BufferTooSmall {
                needed: offset.saturating_add(n),
                available: self.data.len(),
                location: std::panic::Location::caller(),
            }),
        }
    }

    /// Borrow `n` bytes at `offset`.
    #[track_caller]
    pub fn read_bytes(&self, offset: usize, n: usize) -> Result<&[u8]> {
        self.check(offset, n)?;
        Ok(&self.data[offset..offset + n])
    }

    /// Copy `bytes` to `offset`.
    #[track_caller]
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check(offset, bytes.len())?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    #[track_caller]
    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        self.check(offset, N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[offset..offset + N]);
        Ok(bytes)
    }

    #[track_caller]
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    #[track_caller]
    pub fn write_u8(&mut self, offset: usize, val: u8) -> Result<()> {
        self.check(offset, 1)?;
        self.data[offset] = val;
        Ok(())
    }

    le_accessors! {
        read_i16_le, write_i16_le => i16;
        read_u16_le, write_u16_le => u16;
        read_i32_le, write_i32_le => i32;
        read_u32_le, write_u32_le => u32;
        read_i64_le, write_i64_le => i64;
        read_u64_le, write_u64_le => u64;
        read_i128_le, write_i128_le => i128;
        read_u128_le, write_u128_le => u128;
        read_f32_le, write_f32_le => f32;
        read_f64_le, write_f64_le => f64;
    }

    /// Read a 2-byte length prefix followed by that many bytes.
    #[track_caller]
    pub fn read_varying(&self, offset: usize) -> Result<&[u8]> {
        let len = self.read_u16_le(offset)? as usize;
        self.read_bytes(offset + 2, len)
    }

    /// Write a 2-byte length prefix followed by `bytes`.
    #[track_caller]
    pub fn write_varying(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| Error::StringTruncation {
            length: bytes.len(),
            max_length: u16::MAX as u32,
        })?;
        self.check(offset, 2 + bytes.len())?;
        self.write_u16_le(offset, len)?;
        self.write_bytes(offset + 2, bytes)
    }
}
