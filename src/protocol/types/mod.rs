//! Value and metadata types for message slots.

mod blob_id;
mod calendar;
mod decfloat;
mod descriptor;
mod scaled;
mod sql_type;
mod value;

pub use blob_id::BlobId;
pub use calendar::{
    OpaqueDate, OpaqueTime, OpaqueTimeTz, OpaqueTimestamp, OpaqueTimestampTz, TimeTz, TimestampTz,
};
pub use decfloat::{
    DecFloat, DecFloat16, DecFloat34, Decimal128, Decimal64, DecimalFormat, OpaqueDecFloat16,
    OpaqueDecFloat34,
};
pub use descriptor::Descriptor;
pub use scaled::{ScaledInt128, ScaledInt16, ScaledInt32, ScaledInt64, ScaledNumber};
pub use sql_type::{AdjustedType, OriginalType};
pub use value::Value;
