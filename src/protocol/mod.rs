//! Message encoding: slot types, layouts, and conversions.

pub mod buffer;
pub mod constants;
pub mod convert;
pub mod layout;
pub mod types;
pub mod util;
pub mod zones;

pub use buffer::MessageBuffer;
pub use convert::{CalendarConverter, Numeric};
pub use layout::{MessageLayout, MessageLayoutBuilder};
pub use types::{AdjustedType, Descriptor, OriginalType, Value};
pub use util::{DateParts, EngineStatus, EngineUtil, StandardEngineUtil, TimeParts};
pub use zones::TIME_ZONE_TABLE_VERSION;
