//! Dynamically typed slot values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

use super::{
    BlobId, DecFloat16, DecFloat34, ScaledInt128, ScaledInt16, ScaledInt32, ScaledInt64, TimeTz,
    TimestampTz,
};
use crate::protocol::constants::NANOS_PER_TICK;
use crate::protocol::convert::numeric::{float_to_string, number_to_string, Numeric};

/// A single column value, decoded according to its adjusted type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    Boolean(bool),
    /// Exact numerics carry the descriptor's scale.
    Int16(ScaledInt16),
    Int32(ScaledInt32),
    Int64(ScaledInt64),
    Int128(ScaledInt128),
    Float(f32),
    Double(f64),
    DecFloat16(DecFloat16),
    DecFloat34(DecFloat34),
    /// CHAR / VARCHAR text.
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimeTz(TimeTz),
    TimestampTz(TimestampTz),
    /// Blob id; contents are fetched separately.
    Blob(BlobId),
}

impl Value {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a numeric, if it is one.
    pub fn to_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int16(v) => Some(Numeric::Int16(*v)),
            Value::Int32(v) => Some(Numeric::Int32(*v)),
            Value::Int64(v) => Some(Numeric::Int64(*v)),
            Value::Int128(v) => Some(Numeric::Int128(*v)),
            Value::Float(v) => Some(Numeric::Float(*v)),
            Value::Double(v) => Some(Numeric::Double(*v)),
            Value::DecFloat16(v) => Some(Numeric::DecFloat16(*v)),
            Value::DecFloat34(v) => Some(Numeric::DecFloat34(*v)),
            _ => None,
        }
    }

    /// Try to convert to i64, rounding away any fraction.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_numeric()?.to_integer(0).ok()
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        self.to_numeric().map(|n| n.to_float())
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_blob_id(&self) -> Option<BlobId> {
        match self {
            Value::Blob(id) => Some(*id),
            _ => None,
        }
    }
}

fn write_time(f: &mut fmt::Formatter<'_>, time: &NaiveTime) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}.{:04}",
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / NANOS_PER_TICK
    )
}

/// Zone-aware values display their UTC instant; converting to the zone's
/// wall clock needs an engine utility (see `Message::get_string`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int16(v) => f.write_str(&number_to_string(*v)),
            Value::Int32(v) => f.write_str(&number_to_string(*v)),
            Value::Int64(v) => f.write_str(&number_to_string(*v)),
            Value::Int128(v) => f.write_str(&number_to_string(*v)),
            Value::Float(v) => f.write_str(&float_to_string(*v)),
            Value::Double(v) => f.write_str(&float_to_string(*v)),
            Value::DecFloat16(v) => write!(f, "{}", v),
            Value::DecFloat34(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write_time(f, t),
            Value::Timestamp(ts) => {
                write!(f, "{} ", ts.date().format("%Y-%m-%d"))?;
                write_time(f, &ts.time())
            }
            Value::TimeTz(v) => {
                write_time(f, &v.utc_time)?;
                write!(f, " UTC [{}]", v.zone)
            }
            Value::TimestampTz(v) => {
                write!(f, "{} ", v.utc_timestamp.date().format("%Y-%m-%d"))?;
                write_time(f, &v.utc_timestamp.time())?;
                write!(f, " UTC [{}]", v.zone)
            }
            Value::Blob(id) => write!(f, "<BLOB: {}>", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ScaledNumber;

    #[test]
    fn test_value_null() {
        let val = Value::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_value_scaled_number() {
        let val = Value::Int32(ScaledNumber::new(1234567, -2));
        assert!(!val.is_null());
        assert_eq!(val.to_string(), "12345.67");
        assert_eq!(val.to_i64(), Some(12346));
        assert_eq!(val.to_f64(), Some(12345.67));
    }

    #[test]
    fn test_value_string() {
        let val = Value::String("hello".to_string());
        assert_eq!(val.as_str(), Some("hello"));
        assert_eq!(val.to_i64(), None);
        assert_eq!(format!("{}", val), "hello");
    }

    #[test]
    fn test_value_calendar_display() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_micro_opt(13, 14, 15, 123_400)
            .unwrap();
        assert_eq!(Value::Timestamp(ts).to_string(), "2024-02-29 13:14:15.1234");
        assert_eq!(Value::Date(ts.date()).to_string(), "2024-02-29");
        assert_eq!(
            Value::TimestampTz(TimestampTz::new(ts, "-03:00")).to_string(),
            "2024-02-29 13:14:15.1234 UTC [-03:00]"
        );
        assert_eq!(Value::Timestamp(ts).as_date(), Some(ts.date()));
    }

    #[test]
    fn test_value_blob() {
        let val = Value::Blob(BlobId::new(1, 2));
        assert_eq!(val.as_blob_id(), Some(BlobId::new(1, 2)));
        assert_eq!(val.to_string(), "<BLOB: 00000001:00000002>");
    }
}
