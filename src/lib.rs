//! Value marshaling for Firebird message buffers.
//!
//! Statements exchange parameters and rows with the engine as flat,
//! little-endian message buffers described by per-column descriptors. This
//! crate reads and writes Rust values in those buffers, converting between
//! every SQL numeric, calendar, boolean and text type.
//!
//! # Example
//!
//! ```
//! use firebird_marshal::{Message, MessageLayout, OriginalType, Result};
//!
//! fn main() -> Result<()> {
//!     let layout = MessageLayout::builder()
//!         .with_nullable_column(OriginalType::Int64, -2, 8)
//!         .with_nullable_column(OriginalType::TimestampTz, 0, 12)
//!         .build()?
//!         .into_shared();
//!
//!     let mut params = Message::new(layout);
//!     params.set_f64(0, 19.999)?;
//!     params.set_string(1, "2024-02-29 13:14:15.1234 America/Sao_Paulo")?;
//!
//!     assert_eq!(params.get_string(0)?.as_deref(), Some("20.00"));
//!     assert_eq!(
//!         params.get_string(1)?.as_deref(),
//!         Some("2024-02-29 13:14:15.1234 America/Sao_Paulo")
//!     );
//!
//!     params.set_null(0)?;
//!     assert_eq!(params.get_i64(0)?, None);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod message;
pub mod protocol;

// Re-export main types
pub use error::{Error, Result};
pub use message::{FromColumn, FromMessage, FromRow, Message, ToMessage, ToRow};
pub use protocol::constants::LAYOUT_VERSION;
pub use protocol::zones::TIME_ZONE_TABLE_VERSION;
pub use protocol::convert::numeric::{
    number_to_number, number_to_string, string_to_boolean, string_to_double, string_to_scaled,
};
pub use protocol::types::{
    AdjustedType, BlobId, DecFloat, DecFloat16, DecFloat34, Descriptor, OpaqueDate,
    OpaqueDecFloat16, OpaqueDecFloat34, OpaqueTime, OpaqueTimeTz, OpaqueTimestamp,
    OpaqueTimestampTz, OriginalType, ScaledInt128, ScaledInt16, ScaledInt32, ScaledInt64,
    ScaledNumber, TimeTz, TimestampTz, Value,
};
pub use protocol::{
    CalendarConverter, EngineStatus, EngineUtil, MessageLayout, MessageLayoutBuilder, Numeric,
    StandardEngineUtil,
};
