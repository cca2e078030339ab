//! Blob identifier stored in BLOB columns.
//!
//! The message only carries the 8-byte id (ISC_QUAD); blob contents are
//! streamed separately and are not handled here.

use std::fmt;

/// Identifier of a blob, laid out as `{ high: i32, low: u32 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlobId {
    pub high: i32,
    pub low: u32,
}

impl BlobId {
    /// Create a blob id from its two halves.
    pub fn new(high: i32, low: u32) -> Self {
        Self { high, low }
    }

    /// The all-zero id, which denotes no blob.
    pub fn is_empty(&self) -> bool {
        self.high == 0 && self.low == 0
    }

    /// Little-endian wire bytes.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&self.high.to_le_bytes());
        bytes[4..].copy_from_slice(&self.low.to_le_bytes());
        bytes
    }

    /// Decode from little-endian wire bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            high: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            low: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.high as u32, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_layout() {
        let id = BlobId::new(0x12, 0x3456);
        assert_eq!(id.to_bytes(), [0x12, 0, 0, 0, 0x56, 0x34, 0, 0]);
        assert_eq!(BlobId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn test_empty() {
        assert!(BlobId::default().is_empty());
        assert_eq!(BlobId::new(1, 2).to_string(), "00000001:00000002");
    }
}
