//! Engine utility: the trusted primitive that encodes and decodes calendar
//! ticks and time zones.
//!
//! The calendar converter validates and formats values but leaves the tick
//! arithmetic to an `EngineUtil`. `StandardEngineUtil` reproduces the
//! engine's encoding in-process; a binding can supply its own implementation
//! that calls into the client library instead.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use thiserror::Error;

use crate::protocol::constants::{
    STATUS_INVALID_DATE, STATUS_INVALID_TIME, STATUS_INVALID_TIME_ZONE_ID,
    STATUS_INVALID_TIME_ZONE_OFFSET, STATUS_INVALID_TIME_ZONE_REGION, TICKS_PER_DAY,
    TICKS_PER_HOUR, TICKS_PER_MINUTE, TICKS_PER_SECOND, TIME_TZ_REFERENCE_DATE,
    TZ_OFFSET_ID_MAX, TZ_OFFSET_MAX_MINUTES,
};
use crate::protocol::types::{
    OpaqueDate, OpaqueTime, OpaqueTimeTz, OpaqueTimestamp, OpaqueTimestampTz,
};
use crate::protocol::zones::{self, Region};

/// Failure reported by an `EngineUtil`, carried through unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status {code})")]
pub struct EngineStatus {
    pub code: u32,
    pub message: String,
}

impl EngineStatus {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Decomposed calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateParts {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// The date, if it exists in the proleptic Gregorian calendar.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month(), date.day())
    }
}

/// Decomposed time of day; `fractions` counts 100-microsecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeParts {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub fractions: u32,
}

impl TimeParts {
    pub fn new(hours: u32, minutes: u32, seconds: u32, fractions: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            fractions,
        }
    }

    /// The time of day, if every field is in range.
    pub fn to_naive(&self) -> Option<NaiveTime> {
        if self.fractions >= TICKS_PER_SECOND {
            return None;
        }
        NaiveTime::from_hms_nano_opt(
            self.hours,
            self.minutes,
            self.seconds,
            self.fractions * crate::protocol::constants::NANOS_PER_TICK,
        )
    }

    /// Ticks since midnight.
    pub fn ticks(&self) -> u64 {
        self.hours as u64 * TICKS_PER_HOUR as u64
            + self.minutes as u64 * TICKS_PER_MINUTE as u64
            + self.seconds as u64 * TICKS_PER_SECOND as u64
            + self.fractions as u64
    }
}

/// Tick and time zone encoding primitive.
pub trait EngineUtil: Send + Sync {
    fn encode_date(&self, date: DateParts) -> Result<OpaqueDate, EngineStatus>;

    fn decode_date(&self, date: OpaqueDate) -> Result<DateParts, EngineStatus>;

    fn encode_time(&self, time: TimeParts) -> Result<OpaqueTime, EngineStatus>;

    fn decode_time(&self, time: OpaqueTime) -> Result<TimeParts, EngineStatus>;

    /// Encode a local time of day in `zone`.
    fn encode_time_tz(&self, time: TimeParts, zone: &str) -> Result<OpaqueTimeTz, EngineStatus>;

    /// Decode to the local time of day and the zone name.
    fn decode_time_tz(&self, value: &OpaqueTimeTz) -> Result<(TimeParts, String), EngineStatus>;

    /// Encode a local date and time in `zone`.
    fn encode_timestamp_tz(
        &self,
        date: DateParts,
        time: TimeParts,
        zone: &str,
    ) -> Result<OpaqueTimestampTz, EngineStatus>;

    /// Decode to the local date, time of day and zone name.
    fn decode_timestamp_tz(
        &self,
        value: &OpaqueTimestampTz,
    ) -> Result<(DateParts, TimeParts, String), EngineStatus>;
}

/// Offset of the engine's day numbers from the Julian day algorithm.
const JULIAN_DAY_ADJUSTMENT: i64 = 1721119 - 2400001;

/// In-process implementation of the engine's calendar encoding.
///
/// Offset zones (`+03:00`) have ids `offset_minutes + 1439`; region zones
/// take their ids from the built-in zone table, counting down from 65535. A local time inside a
/// daylight saving gap is taken with the offset in effect before the gap;
/// an ambiguous local time resolves to the earlier instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEngineUtil;

impl StandardEngineUtil {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    /// Fixed offset east of UTC, in minutes.
    Offset(i32),
    Region(Region),
}

impl Zone {
    fn parse(name: &str) -> Result<Self, EngineStatus> {
        match name.as_bytes().first() {
            Some(b'+') | Some(b'-') => Self::parse_offset(name),
            _ => zones::region_by_name(name).map(Zone::Region).ok_or_else(|| {
                EngineStatus::new(
                    STATUS_INVALID_TIME_ZONE_REGION,
                    format!("Invalid time zone region: {}", name),
                )
            }),
        }
    }

    /// `+HH:MM`, `-HH:MM`, `+HH` or `-H`.
    fn parse_offset(name: &str) -> Result<Self, EngineStatus> {
        let invalid = || {
            EngineStatus::new(
                STATUS_INVALID_TIME_ZONE_OFFSET,
                format!("Invalid time zone offset: {}", name),
            )
        };

        let (sign, rest) = name.split_at(1);
        let (hours, minutes) = match rest.split_once(':') {
            Some((hours, minutes)) if minutes.len() == 2 => (hours, minutes),
            Some(_) => return Err(invalid()),
            None => (rest, "00"),
        };
        if hours.is_empty()
            || hours.len() > 2
            || !hours.bytes().all(|c| c.is_ascii_digit())
            || !minutes.bytes().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        let total = hours * 60 + minutes;
        Ok(Zone::Offset(if sign == "-" { -total } else { total }))
    }

    fn from_id(id: u16) -> Result<Self, EngineStatus> {
        if id <= TZ_OFFSET_ID_MAX {
            return Ok(Zone::Offset(id as i32 - TZ_OFFSET_MAX_MINUTES));
        }
        zones::region_by_id(id)
            .map(Zone::Region)
            .ok_or_else(|| {
                EngineStatus::new(
                    STATUS_INVALID_TIME_ZONE_ID,
                    format!("Invalid time zone id: {}", id),
                )
            })
    }

    fn id(&self) -> u16 {
        match self {
            Zone::Offset(minutes) => (minutes + TZ_OFFSET_MAX_MINUTES) as u16,
            Zone::Region(region) => region.id,
        }
    }

    fn name(&self) -> String {
        match self {
            Zone::Offset(minutes) => {
                let sign = if *minutes < 0 { '-' } else { '+' };
                let abs = minutes.abs();
                format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
            Zone::Region(region) => region.name.to_string(),
        }
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> Result<NaiveDateTime, EngineStatus> {
        let offset_seconds = match self {
            Zone::Offset(minutes) => minutes * 60,
            Zone::Region(region) => match region.tz.from_local_datetime(&local) {
                chrono::LocalResult::Single(dt) => return Ok(dt.naive_utc()),
                chrono::LocalResult::Ambiguous(earliest, _) => return Ok(earliest.naive_utc()),
                chrono::LocalResult::None => {
                    let before = local
                        .checked_sub_signed(Duration::days(1))
                        .ok_or_else(|| out_of_range(local))?;
                    region
                        .tz
                        .offset_from_utc_datetime(&before)
                        .fix()
                        .local_minus_utc()
                }
            },
        };
        local
            .checked_sub_signed(Duration::seconds(offset_seconds as i64))
            .ok_or_else(|| out_of_range(local))
    }

    fn utc_to_local(&self, utc: NaiveDateTime) -> Result<NaiveDateTime, EngineStatus> {
        match self {
            Zone::Offset(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(|offset| offset.from_utc_datetime(&utc).naive_local())
                .ok_or_else(|| {
                    EngineStatus::new(
                        STATUS_INVALID_TIME_ZONE_OFFSET,
                        format!("Invalid time zone offset: {}", minutes),
                    )
                }),
            Zone::Region(region) => Ok(region.tz.from_utc_datetime(&utc).naive_local()),
        }
    }
}

fn out_of_range(value: NaiveDateTime) -> EngineStatus {
    EngineStatus::new(STATUS_INVALID_DATE, format!("Timestamp out of range: {}", value))
}

fn reference_date() -> Result<NaiveDate, EngineStatus> {
    let (year, month, day) = TIME_TZ_REFERENCE_DATE;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EngineStatus::new(STATUS_INVALID_DATE, "Invalid reference date"))
}

fn naive_date(date: DateParts) -> Result<NaiveDate, EngineStatus> {
    date.to_naive().ok_or_else(|| {
        EngineStatus::new(
            STATUS_INVALID_DATE,
            format!("Invalid date: {}-{}-{}", date.year, date.month, date.day),
        )
    })
}

fn naive_time(time: TimeParts) -> Result<NaiveTime, EngineStatus> {
    time.to_naive().ok_or_else(|| {
        EngineStatus::new(
            STATUS_INVALID_TIME,
            format!(
                "Invalid time: {}:{}:{}.{}",
                time.hours, time.minutes, time.seconds, time.fractions
            ),
        )
    })
}

fn time_parts(time: NaiveTime) -> TimeParts {
    use chrono::Timelike;
    TimeParts::new(
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / crate::protocol::constants::NANOS_PER_TICK,
    )
}

impl StandardEngineUtil {
    fn encode_utc(&self, utc: NaiveDateTime) -> Result<OpaqueTimestamp, EngineStatus> {
        Ok(OpaqueTimestamp::new(
            self.encode_date(DateParts::from(utc.date()))?,
            self.encode_time(time_parts(utc.time()))?,
        ))
    }

    fn decode_utc(&self, value: &OpaqueTimestamp) -> Result<NaiveDateTime, EngineStatus> {
        let date = naive_date(self.decode_date(value.date)?)?;
        let time = naive_time(self.decode_time(value.time)?)?;
        Ok(date.and_time(time))
    }
}

impl EngineUtil for StandardEngineUtil {
    fn encode_date(&self, date: DateParts) -> Result<OpaqueDate, EngineStatus> {
        let (mut year, mut month) = (date.year as i64, date.month as i64);
        if month > 2 {
            month -= 3;
        } else {
            month += 9;
            year -= 1;
        }

        let century = year / 100;
        let year_of_century = year - 100 * century;
        let days = (146097 * century) / 4
            + (1461 * year_of_century) / 4
            + (153 * month + 2) / 5
            + date.day as i64
            + JULIAN_DAY_ADJUSTMENT;

        i32::try_from(days).map(OpaqueDate).map_err(|_| {
            EngineStatus::new(STATUS_INVALID_DATE, format!("Date out of range: {:?}", date))
        })
    }

    fn decode_date(&self, date: OpaqueDate) -> Result<DateParts, EngineStatus> {
        let mut nday = date.0 as i64 - JULIAN_DAY_ADJUSTMENT;

        let century = (4 * nday - 1) / 146097;
        nday = 4 * nday - 1 - 146097 * century;
        let mut day = nday / 4;

        nday = (4 * day + 3) / 1461;
        day = 4 * day + 3 - 1461 * nday;
        day = (day + 4) / 4;

        let mut month = (5 * day - 3) / 153;
        day = 5 * day - 3 - 153 * month;
        day = (day + 5) / 5;

        let mut year = 100 * century + nday;
        if month < 10 {
            month += 3;
        } else {
            month -= 9;
            year += 1;
        }

        let year = i32::try_from(year).map_err(|_| {
            EngineStatus::new(STATUS_INVALID_DATE, format!("Date out of range: {}", date.0))
        })?;
        Ok(DateParts::new(year, month as u32, day as u32))
    }

    fn encode_time(&self, time: TimeParts) -> Result<OpaqueTime, EngineStatus> {
        u32::try_from(time.ticks()).map(OpaqueTime).map_err(|_| {
            EngineStatus::new(STATUS_INVALID_TIME, format!("Time out of range: {:?}", time))
        })
    }

    fn decode_time(&self, time: OpaqueTime) -> Result<TimeParts, EngineStatus> {
        let ticks = time.0;
        Ok(TimeParts::new(
            ticks / TICKS_PER_HOUR,
            (ticks / TICKS_PER_MINUTE) % 60,
            (ticks / TICKS_PER_SECOND) % 60,
            ticks % TICKS_PER_SECOND,
        ))
    }

    fn encode_time_tz(&self, time: TimeParts, zone: &str) -> Result<OpaqueTimeTz, EngineStatus> {
        let zone = Zone::parse(zone)?;
        let local = reference_date()?.and_time(naive_time(time)?);
        let utc = zone.local_to_utc(local)?;
        Ok(OpaqueTimeTz {
            utc_time: self.encode_time(time_parts(utc.time()))?,
            time_zone: zone.id(),
        })
    }

    fn decode_time_tz(&self, value: &OpaqueTimeTz) -> Result<(TimeParts, String), EngineStatus> {
        let zone = Zone::from_id(value.time_zone)?;
        let utc = reference_date()?.and_time(naive_time(self.decode_time(value.utc_time)?)?);
        let local = zone.utc_to_local(utc)?;
        Ok((time_parts(local.time()), zone.name()))
    }

    fn encode_timestamp_tz(
        &self,
        date: DateParts,
        time: TimeParts,
        zone: &str,
    ) -> Result<OpaqueTimestampTz, EngineStatus> {
        let zone = Zone::parse(zone)?;
        let local = naive_date(date)?.and_time(naive_time(time)?);
        let utc = zone.local_to_utc(local)?;
        Ok(OpaqueTimestampTz {
            utc_timestamp: self.encode_utc(utc)?,
            time_zone: zone.id(),
        })
    }

    fn decode_timestamp_tz(
        &self,
        value: &OpaqueTimestampTz,
    ) -> Result<(DateParts, TimeParts, String), EngineStatus> {
        let zone = Zone::from_id(value.time_zone)?;
        let utc = self.decode_utc(&value.utc_timestamp)?;
        let local = zone.utc_to_local(utc)?;
        Ok((
            DateParts::from(local.date()),
            time_parts(local.time()),
            zone.name(),
        ))
    }
}

/// Ticks between two UTC instants' times of day, modulo one day.
pub(crate) fn ticks_of_day_difference(later: u32, earlier: u32) -> u32 {
    (later as i64 - earlier as i64).rem_euclid(TICKS_PER_DAY as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn util() -> StandardEngineUtil {
        StandardEngineUtil::new()
    }

    #[test]
    fn test_encode_date_epoch() {
        assert_eq!(util().encode_date(DateParts::new(1858, 11, 17)).unwrap(), OpaqueDate(0));
        assert_eq!(util().encode_date(DateParts::new(1858, 11, 18)).unwrap(), OpaqueDate(1));
        assert_eq!(util().encode_date(DateParts::new(2024, 2, 29)).unwrap(), OpaqueDate(60369));
    }

    #[test]
    fn test_decode_date_matches_chrono() {
        let epoch = NaiveDate::from_ymd_opt(1858, 11, 17).unwrap();
        for days in [-678575, -100000, -1, 0, 1, 59, 60369, 1000000, 2973483] {
            let expected = epoch + Duration::days(days as i64);
            let parts = util().decode_date(OpaqueDate(days)).unwrap();
            assert_eq!(parts.to_naive(), Some(expected), "{days}");
            assert_eq!(util().encode_date(parts).unwrap(), OpaqueDate(days));
        }
    }

    #[test]
    fn test_time_ticks() {
        let time = TimeParts::new(13, 14, 15, 1234);
        let opaque = util().encode_time(time).unwrap();
        assert_eq!(opaque, OpaqueTime(13 * 36_000_000 + 14 * 600_000 + 15 * 10_000 + 1234));
        assert_eq!(util().decode_time(opaque).unwrap(), time);
    }

    #[test]
    fn test_offset_zone_ids() {
        let value = util()
            .encode_time_tz(TimeParts::new(11, 14, 15, 1234), "-03:00")
            .unwrap();
        assert_eq!(value.time_zone, 1439 - 180);
        assert_eq!(value.utc_time, util().encode_time(TimeParts::new(14, 14, 15, 1234)).unwrap());

        let (local, zone) = util().decode_time_tz(&value).unwrap();
        assert_eq!(local, TimeParts::new(11, 14, 15, 1234));
        assert_eq!(zone, "-03:00");

        assert_eq!(Zone::parse("+00:00").unwrap().id(), 1439);
        assert_eq!(Zone::parse("+5").unwrap(), Zone::Offset(300));
        assert_eq!(Zone::from_id(0).unwrap().name(), "-23:59");
        assert_eq!(Zone::from_id(2878).unwrap().name(), "+23:59");
    }

    #[test]
    fn test_invalid_offsets() {
        for zone in ["+24:00", "-03:60", "+3:0", "+", "+ab:00", "+123"] {
            let result = Zone::parse(zone);
            assert!(
                matches!(&result, Err(status) if status.code == STATUS_INVALID_TIME_ZONE_OFFSET),
                "{zone}"
            );
        }
    }

    #[test]
    fn test_region_zone_round_trip() {
        let zone = Zone::parse("America/Sao_Paulo").unwrap();
        let id = zone.id();
        assert!(id > TZ_OFFSET_ID_MAX);
        assert_eq!(Zone::from_id(id).unwrap(), zone);
        assert_eq!(Zone::parse("UTC").unwrap().name(), "UTC");

        let value = util().encode_time_tz(TimeParts::default(), "GMT").unwrap();
        assert_eq!(value.time_zone, 65535);
        assert_eq!(util().decode_time_tz(&value).unwrap().1, "GMT");
    }

    #[test]
    fn test_unknown_region() {
        let result = util().encode_time_tz(TimeParts::default(), "Mars/Olympus_Mons");
        assert!(matches!(result, Err(status) if status.code == STATUS_INVALID_TIME_ZONE_REGION));
    }

    #[test]
    fn test_timestamp_tz_region() {
        let value = util()
            .encode_timestamp_tz(
                DateParts::new(2024, 2, 29),
                TimeParts::new(13, 14, 15, 1234),
                "America/Sao_Paulo",
            )
            .unwrap();
        assert_eq!(
            value.utc_timestamp,
            OpaqueTimestamp::new(
                OpaqueDate(60369),
                OpaqueTime(16 * 36_000_000 + 14 * 600_000 + 15 * 10_000 + 1234)
            )
        );
        let (date, time, zone) = util().decode_timestamp_tz(&value).unwrap();
        assert_eq!(date, DateParts::new(2024, 2, 29));
        assert_eq!(time, TimeParts::new(13, 14, 15, 1234));
        assert_eq!(zone, "America/Sao_Paulo");
    }

    #[test]
    fn test_dst_gap_uses_offset_before_gap() {
        // 2021-03-14 02:30 does not exist in New York; EST (-05:00) applies.
        let value = util()
            .encode_timestamp_tz(
                DateParts::new(2021, 3, 14),
                TimeParts::new(2, 30, 0, 0),
                "America/New_York",
            )
            .unwrap();
        let expected = util()
            .encode_time(TimeParts::new(7, 30, 0, 0))
            .unwrap();
        assert_eq!(value.utc_timestamp.time, expected);
    }

    #[test]
    fn test_invalid_zone_id() {
        let value = OpaqueTimeTz {
            utc_time: OpaqueTime(0),
            time_zone: 10_000,
        };
        assert!(matches!(
            util().decode_time_tz(&value),
            Err(status) if status.code == STATUS_INVALID_TIME_ZONE_ID
        ));
    }

    #[test]
    fn test_ticks_of_day_difference() {
        assert_eq!(ticks_of_day_difference(10, 5), 5);
        assert_eq!(ticks_of_day_difference(5, 10), TICKS_PER_DAY - 5);
    }
}
