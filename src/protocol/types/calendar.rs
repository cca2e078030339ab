//! Calendar value types.
//!
//! Plain date/time values use chrono's naive types directly. Zone-aware
//! values keep the instant normalized to UTC together with the zone name it
//! was given in; the zone is only applied when formatting.
//!
//! The `Opaque*` types hold the engine's tick encoding:
//! - date: days since 1858-11-17
//! - time: 100-microsecond ticks since midnight
//! - zone: engine time zone id

use chrono::{NaiveDateTime, NaiveTime};

/// TIME WITH TIME ZONE value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeTz {
    /// Time of day in UTC.
    pub utc_time: NaiveTime,
    /// Zone name, either a region (`America/Sao_Paulo`) or an offset (`-03:00`).
    pub zone: String,
}

impl TimeTz {
    pub fn new(utc_time: NaiveTime, zone: impl Into<String>) -> Self {
        Self {
            utc_time,
            zone: zone.into(),
        }
    }
}

/// TIMESTAMP WITH TIME ZONE value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimestampTz {
    /// Instant in UTC.
    pub utc_timestamp: NaiveDateTime,
    /// Zone name, either a region (`America/Sao_Paulo`) or an offset (`-03:00`).
    pub zone: String,
}

impl TimestampTz {
    pub fn new(utc_timestamp: NaiveDateTime, zone: impl Into<String>) -> Self {
        Self {
            utc_timestamp,
            zone: zone.into(),
        }
    }
}

/// Engine DATE encoding: days since 1858-11-17.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueDate(pub i32);

/// Engine TIME encoding: 100-microsecond ticks since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueTime(pub u32);

/// Engine TIMESTAMP encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueTimestamp {
    pub date: OpaqueDate,
    pub time: OpaqueTime,
}

impl OpaqueTimestamp {
    pub fn new(date: OpaqueDate, time: OpaqueTime) -> Self {
        Self { date, time }
    }
}

/// Engine TIME WITH TIME ZONE encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueTimeTz {
    pub utc_time: OpaqueTime,
    pub time_zone: u16,
}

/// Engine TIMESTAMP WITH TIME ZONE encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueTimestampTz {
    pub utc_timestamp: OpaqueTimestamp,
    pub time_zone: u16,
}
