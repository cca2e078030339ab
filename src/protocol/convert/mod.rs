//! Conversions between Rust values and slot encodings.

pub mod calendar;
pub mod numeric;

pub use calendar::CalendarConverter;
pub use numeric::{BinaryFloat, ExactInteger, Numeric};
