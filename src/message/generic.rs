//! Type-directed access: `message.get::<T>(index)` and
//! `message.set(index, value)` for single columns, `message.get_row::<R>()`
//! and `message.set_row(row)` for whole messages bound to tuples.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::Message;
use crate::error::{Error, Result};
use crate::protocol::convert::numeric::Numeric;
use crate::protocol::types::{
    BlobId, DecFloat16, DecFloat34, OpaqueDate, OpaqueDecFloat16, OpaqueDecFloat34, OpaqueTime,
    OpaqueTimeTz, OpaqueTimestamp, OpaqueTimestampTz, ScaledInt128, ScaledInt16, ScaledInt32,
    ScaledInt64, TimeTz, TimestampTz, Value,
};

/// Types that can be read from a message slot.
pub trait FromMessage: Sized {
    fn from_message(message: &Message, index: usize) -> Result<Option<Self>>;
}

/// Types that can be written to a message slot.
///
/// `Option<T>` writes null for `None`.
pub trait ToMessage {
    fn to_message(self, message: &mut Message, index: usize) -> Result<()>;
}

/// A single row field. `Option<T>` accepts NULL; any other field type
/// fails with `UnexpectedNull`.
pub trait FromColumn: Sized {
    fn from_column(message: &Message, index: usize) -> Result<Self>;
}

/// Types that read a whole message, one field per column.
pub trait FromRow: Sized {
    /// Number of columns the row binds.
    const FIELDS: usize;

    fn from_row(message: &Message) -> Result<Self>;
}

/// Types that write a whole message, one field per column.
pub trait ToRow {
    /// Number of columns the row binds.
    const FIELDS: usize;

    fn to_row(self, message: &mut Message) -> Result<()>;
}

fn required<T>(value: Option<T>, index: usize) -> Result<T> {
    value.ok_or(Error::UnexpectedNull { index })
}

macro_rules! impl_message_value {
    ($($ty:ty => $get:ident, $set:ident;)*) => {
        $(
            impl FromMessage for $ty {
                fn from_message(message: &Message, index: usize) -> Result<Option<Self>> {
                    message.$get(index)
                }
            }

            impl FromColumn for $ty {
                fn from_column(message: &Message, index: usize) -> Result<Self> {
                    required(message.$get(index)?, index)
                }
            }

            impl ToMessage for $ty {
                fn to_message(self, message: &mut Message, index: usize) -> Result<()> {
                    message.$set(index, self)
                }
            }
        )*
    };
}

impl_message_value! {
    bool => get_bool, set_bool;
    i16 => get_i16, set_i16;
    i32 => get_i32, set_i32;
    i64 => get_i64, set_i64;
    i128 => get_i128, set_i128;
    ScaledInt16 => get_scaled_i16, set_scaled_i16;
    ScaledInt32 => get_scaled_i32, set_scaled_i32;
    ScaledInt64 => get_scaled_i64, set_scaled_i64;
    ScaledInt128 => get_scaled_i128, set_scaled_i128;
    f32 => get_f32, set_f32;
    f64 => get_f64, set_f64;
    DecFloat16 => get_decfloat16, set_decfloat16;
    DecFloat34 => get_decfloat34, set_decfloat34;
    OpaqueDecFloat16 => get_opaque_decfloat16, set_opaque_decfloat16;
    OpaqueDecFloat34 => get_opaque_decfloat34, set_opaque_decfloat34;
    Numeric => get_numeric, set_numeric;
    NaiveDate => get_date, set_date;
    OpaqueDate => get_opaque_date, set_opaque_date;
    NaiveTime => get_time, set_time;
    OpaqueTime => get_opaque_time, set_opaque_time;
    NaiveDateTime => get_timestamp, set_timestamp;
    OpaqueTimestamp => get_opaque_timestamp, set_opaque_timestamp;
    TimeTz => get_time_tz, set_time_tz;
    OpaqueTimeTz => get_opaque_time_tz, set_opaque_time_tz;
    TimestampTz => get_timestamp_tz, set_timestamp_tz;
    OpaqueTimestampTz => get_opaque_timestamp_tz, set_opaque_timestamp_tz;
    BlobId => get_blob_id, set_blob_id;
}

impl FromMessage for String {
    fn from_message(message: &Message, index: usize) -> Result<Option<Self>> {
        message.get_string(index)
    }
}

impl ToMessage for String {
    fn to_message(self, message: &mut Message, index: usize) -> Result<()> {
        message.set_string(index, self.as_str())
    }
}

impl ToMessage for &str {
    fn to_message(self, message: &mut Message, index: usize) -> Result<()> {
        message.set_string(index, self)
    }
}

impl ToMessage for &String {
    fn to_message(self, message: &mut Message, index: usize) -> Result<()> {
        message.set_string(index, self.as_str())
    }
}

impl<T: ToMessage> ToMessage for Option<T> {
    fn to_message(self, message: &mut Message, index: usize) -> Result<()> {
        match self {
            Some(value) => value.to_message(message, index),
            None => message.set_null(index),
        }
    }
}

impl FromColumn for String {
    fn from_column(message: &Message, index: usize) -> Result<Self> {
        required(message.get_string(index)?, index)
    }
}

impl<T: FromMessage> FromColumn for Option<T> {
    fn from_column(message: &Message, index: usize) -> Result<Self> {
        T::from_message(message, index)
    }
}

impl FromColumn for Value {
    fn from_column(message: &Message, index: usize) -> Result<Self> {
        message.get_value(index)
    }
}

macro_rules! impl_row_tuple {
    ($fields:expr => $($name:ident $index:tt),+) => {
        impl<$($name: FromColumn),+> FromRow for ($($name,)+) {
            const FIELDS: usize = $fields;

            fn from_row(message: &Message) -> Result<Self> {
                Ok(($($name::from_column(message, $index)?,)+))
            }
        }

        impl<$($name: ToMessage),+> ToRow for ($($name,)+) {
            const FIELDS: usize = $fields;

            fn to_row(self, message: &mut Message) -> Result<()> {
                $(self.$index.to_message(message, $index)?;)+
                Ok(())
            }
        }
    };
}

impl_row_tuple!(1 => A 0);
impl_row_tuple!(2 => A 0, B 1);
impl_row_tuple!(3 => A 0, B 1, C 2);
impl_row_tuple!(4 => A 0, B 1, C 2, D 3);
impl_row_tuple!(5 => A 0, B 1, C 2, D 3, E 4);
impl_row_tuple!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
impl_row_tuple!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_row_tuple!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_row_tuple!(9 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_row_tuple!(10 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_row_tuple!(11 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_row_tuple!(12 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

fn check_fields(fields: usize, columns: usize) -> Result<()> {
    if fields == columns {
        Ok(())
    } else {
        Err(Error::FieldCountMismatch { fields, columns })
    }
}

impl Message {
    /// Read every column into a row type such as `(i32, Option<String>)`.
    ///
    /// Fails with `FieldCountMismatch` unless the row has exactly one field
    /// per column, and with `UnexpectedNull` when a NULL column meets a
    /// field that is not an `Option`.
    pub fn get_row<R: FromRow>(&self) -> Result<R> {
        check_fields(R::FIELDS, self.len())?;
        R::from_row(self)
    }

    /// Write every column from a row type, in column order.
    ///
    /// Columns are written one at a time; on error the earlier columns keep
    /// their new values and the failing column is left null.
    pub fn set_row<R: ToRow>(&mut self, row: R) -> Result<()> {
        check_fields(R::FIELDS, self.len())?;
        row.to_row(self)
    }
}
