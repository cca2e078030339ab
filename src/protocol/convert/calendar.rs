//! Calendar conversions between chrono values, engine tick encodings and
//! text.
//!
//! Tick arithmetic and zone resolution are delegated to an `EngineUtil`;
//! this module owns validation, parsing and formatting. Text forms:
//!
//! - date: `YYYY-MM-DD`
//! - time: `HH:MM:SS.ffff`
//! - timestamp: `YYYY-MM-DD HH:MM:SS.ffff`
//! - zoned forms append ` <zone>`
//!
//! Parsing tolerates whitespace around every field. The fraction is optional
//! and holds 1 to 4 digits, right-padded to ticks.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, Result};
use crate::protocol::constants::{
    NANOS_PER_TICK, TICKS_PER_DAY, TICKS_PER_MINUTE, TICKS_PER_SECOND, TIME_TZ_REFERENCE_DATE,
    TZ_OFFSET_ID_MAX, TZ_OFFSET_MAX_MINUTES,
};
use crate::protocol::types::{
    OpaqueDate, OpaqueTime, OpaqueTimeTz, OpaqueTimestamp, OpaqueTimestampTz, TimeTz,
    TimestampTz,
};
use crate::protocol::util::{ticks_of_day_difference, DateParts, EngineUtil, TimeParts};

/// Calendar converter bound to an engine utility.
#[derive(Clone, Copy)]
pub struct CalendarConverter<'a> {
    util: &'a dyn EngineUtil,
}

impl<'a> CalendarConverter<'a> {
    pub fn new(util: &'a dyn EngineUtil) -> Self {
        Self { util }
    }

    // --- DATE ---

    /// Encode a date. Years before 1 are rejected.
    pub fn date_to_opaque_date(&self, date: &NaiveDate) -> Result<OpaqueDate> {
        if date.year() < 1 {
            return Err(Error::InvalidDate);
        }
        Ok(self.util.encode_date(DateParts::from(*date))?)
    }

    pub fn opaque_date_to_date(&self, date: OpaqueDate) -> Result<NaiveDate> {
        let parts = self.util.decode_date(date)?;
        valid_date(parts).ok_or(Error::InvalidDate)
    }

    pub fn date_to_string(&self, date: &NaiveDate) -> String {
        format_date(DateParts::from(*date))
    }

    pub fn string_to_date(&self, text: &str) -> Result<NaiveDate> {
        let mut scanner = Scanner::new(text);
        let parts = scanner
            .date()
            .filter(|_| scanner.finish())
            .ok_or_else(|| Error::conversion_from_string(text))?;
        valid_date(parts).ok_or(Error::InvalidDate)
    }

    pub fn string_to_opaque_date(&self, text: &str) -> Result<OpaqueDate> {
        let date = self.string_to_date(text)?;
        self.date_to_opaque_date(&date)
    }

    pub fn opaque_date_to_string(&self, date: OpaqueDate) -> Result<String> {
        Ok(self.date_to_string(&self.opaque_date_to_date(date)?))
    }

    // --- TIME ---

    /// Encode a time of day. Sub-second precision must be a whole number of
    /// 100-microsecond ticks.
    pub fn time_to_opaque_time(&self, time: &NaiveTime) -> Result<OpaqueTime> {
        let parts = exact_time_parts(time).ok_or(Error::InvalidTime)?;
        Ok(self.util.encode_time(parts)?)
    }

    pub fn opaque_time_to_time(&self, time: OpaqueTime) -> Result<NaiveTime> {
        if time.0 >= TICKS_PER_DAY {
            return Err(Error::InvalidTime);
        }
        let parts = self.util.decode_time(time)?;
        parts.to_naive().ok_or(Error::InvalidTime)
    }

    pub fn time_to_string(&self, time: &NaiveTime) -> String {
        format_time(truncated_time_parts(time))
    }

    pub fn string_to_time(&self, text: &str) -> Result<NaiveTime> {
        let mut scanner = Scanner::new(text);
        let parts = scanner
            .time()
            .filter(|_| scanner.finish())
            .ok_or_else(|| Error::conversion_from_string(text))?;
        valid_time(parts).ok_or(Error::InvalidTime)
    }

    pub fn string_to_opaque_time(&self, text: &str) -> Result<OpaqueTime> {
        let time = self.string_to_time(text)?;
        self.time_to_opaque_time(&time)
    }

    pub fn opaque_time_to_string(&self, time: OpaqueTime) -> Result<String> {
        Ok(self.time_to_string(&self.opaque_time_to_time(time)?))
    }

    // --- TIMESTAMP ---

    pub fn timestamp_to_opaque_timestamp(
        &self,
        timestamp: &NaiveDateTime,
    ) -> Result<OpaqueTimestamp> {
        if timestamp.year() < 1 {
            return Err(Error::InvalidTimestamp);
        }
        let time = exact_time_parts(&timestamp.time()).ok_or(Error::InvalidTimestamp)?;
        Ok(OpaqueTimestamp::new(
            self.util.encode_date(DateParts::from(timestamp.date()))?,
            self.util.encode_time(time)?,
        ))
    }

    pub fn opaque_timestamp_to_timestamp(
        &self,
        timestamp: &OpaqueTimestamp,
    ) -> Result<NaiveDateTime> {
        if timestamp.time.0 >= TICKS_PER_DAY {
            return Err(Error::InvalidTimestamp);
        }
        let date = valid_date(self.util.decode_date(timestamp.date)?)
            .ok_or(Error::InvalidTimestamp)?;
        let time = self
            .util
            .decode_time(timestamp.time)?
            .to_naive()
            .ok_or(Error::InvalidTimestamp)?;
        Ok(date.and_time(time))
    }

    pub fn timestamp_to_string(&self, timestamp: &NaiveDateTime) -> String {
        format!(
            "{} {}",
            self.date_to_string(&timestamp.date()),
            self.time_to_string(&timestamp.time())
        )
    }

    pub fn string_to_timestamp(&self, text: &str) -> Result<NaiveDateTime> {
        let mut scanner = Scanner::new(text);
        let (date, time) = scanner
            .timestamp()
            .filter(|_| scanner.finish())
            .ok_or_else(|| Error::conversion_from_string(text))?;
        valid_timestamp(date, time).ok_or(Error::InvalidTimestamp)
    }

    pub fn string_to_opaque_timestamp(&self, text: &str) -> Result<OpaqueTimestamp> {
        let timestamp = self.string_to_timestamp(text)?;
        self.timestamp_to_opaque_timestamp(&timestamp)
    }

    pub fn opaque_timestamp_to_string(&self, timestamp: &OpaqueTimestamp) -> Result<String> {
        Ok(self.timestamp_to_string(&self.opaque_timestamp_to_timestamp(timestamp)?))
    }

    // --- TIME WITH TIME ZONE ---

    /// Encode a zoned time. The UTC time is stored as given; the zone name
    /// is resolved to its id.
    pub fn time_tz_to_opaque_time_tz(&self, time: &TimeTz) -> Result<OpaqueTimeTz> {
        let utc = exact_time_parts(&time.utc_time).ok_or(Error::InvalidTime)?;
        let zone = self.util.encode_time_tz(TimeParts::default(), &time.zone)?;
        Ok(OpaqueTimeTz {
            utc_time: self.util.encode_time(utc)?,
            time_zone: zone.time_zone,
        })
    }

    pub fn opaque_time_tz_to_time_tz(&self, time: &OpaqueTimeTz) -> Result<TimeTz> {
        let utc_time = self.opaque_time_to_time(time.utc_time)?;
        let (_, zone) = self.util.decode_time_tz(time)?;
        Ok(TimeTz::new(utc_time, zone))
    }

    /// Format as local time of day followed by the zone name.
    pub fn time_tz_to_string(&self, time: &TimeTz) -> Result<String> {
        let opaque = self.time_tz_to_opaque_time_tz(time)?;
        self.opaque_time_tz_to_string(&opaque)
    }

    /// Parse a local time of day and zone (`11:14:15.1234 -03:00`).
    ///
    /// Region offsets are taken on the reference date 2020-01-01.
    pub fn string_to_time_tz(&self, text: &str) -> Result<TimeTz> {
        let opaque = self.string_to_opaque_time_tz(text)?;
        self.opaque_time_tz_to_time_tz(&opaque)
    }

    pub fn string_to_opaque_time_tz(&self, text: &str) -> Result<OpaqueTimeTz> {
        let mut scanner = Scanner::new(text);
        let (parts, zone) = scanner
            .time()
            .and_then(|time| scanner.zone().map(|zone| (time, zone)))
            .filter(|_| scanner.finish())
            .ok_or_else(|| Error::conversion_from_string(text))?;
        valid_time(parts).ok_or(Error::InvalidTime)?;

        let opaque = self.util.encode_time_tz(parts, zone)?;

        let local_ticks = u32::try_from(parts.ticks()).map_err(|_| Error::InvalidTime)?;
        let offset = ticks_of_day_difference(local_ticks, opaque.utc_time.0);
        if offset % TICKS_PER_MINUTE != 0 {
            tracing::debug!(text, offset, "time zone offset is not a whole number of minutes");
            return Err(Error::InvalidTime);
        }
        Ok(opaque)
    }

    pub fn opaque_time_tz_to_string(&self, time: &OpaqueTimeTz) -> Result<String> {
        if time.utc_time.0 >= TICKS_PER_DAY {
            return Err(Error::InvalidTime);
        }
        let (local, zone) = self.util.decode_time_tz(time)?;
        Ok(format!("{} {}", format_time(local), zone))
    }

    // --- TIMESTAMP WITH TIME ZONE ---

    /// Encode a zoned timestamp. The UTC instant is stored as given; the
    /// zone name is resolved to its id.
    pub fn timestamp_tz_to_opaque_timestamp_tz(
        &self,
        timestamp: &TimestampTz,
    ) -> Result<OpaqueTimestampTz> {
        let utc_timestamp = self.timestamp_to_opaque_timestamp(&timestamp.utc_timestamp)?;
        let zone = self.util.encode_timestamp_tz(
            reference_date_parts(),
            TimeParts::default(),
            &timestamp.zone,
        )?;
        Ok(OpaqueTimestampTz {
            utc_timestamp,
            time_zone: zone.time_zone,
        })
    }

    pub fn opaque_timestamp_tz_to_timestamp_tz(
        &self,
        timestamp: &OpaqueTimestampTz,
    ) -> Result<TimestampTz> {
        let utc_timestamp = self.opaque_timestamp_to_timestamp(&timestamp.utc_timestamp)?;
        let (_, _, zone) = self.util.decode_timestamp_tz(timestamp)?;
        Ok(TimestampTz::new(utc_timestamp, zone))
    }

    /// Format as local date and time followed by the zone name.
    pub fn timestamp_tz_to_string(&self, timestamp: &TimestampTz) -> Result<String> {
        let opaque = self.timestamp_tz_to_opaque_timestamp_tz(timestamp)?;
        self.opaque_timestamp_tz_to_string(&opaque)
    }

    /// Parse a local timestamp and zone
    /// (`2024-02-29 13:14:15.1234 America/Sao_Paulo`).
    pub fn string_to_timestamp_tz(&self, text: &str) -> Result<TimestampTz> {
        let opaque = self.string_to_opaque_timestamp_tz(text)?;
        self.opaque_timestamp_tz_to_timestamp_tz(&opaque)
    }

    pub fn string_to_opaque_timestamp_tz(&self, text: &str) -> Result<OpaqueTimestampTz> {
        let mut scanner = Scanner::new(text);
        let ((date, time), zone) = scanner
            .timestamp()
            .and_then(|timestamp| scanner.zone().map(|zone| (timestamp, zone)))
            .filter(|_| scanner.finish())
            .ok_or_else(|| Error::conversion_from_string(text))?;
        let local = valid_timestamp(date, time).ok_or(Error::InvalidTimestamp)?;

        let opaque = self.util.encode_timestamp_tz(date, time, zone)?;

        let utc = self.opaque_timestamp_to_timestamp(&opaque.utc_timestamp)?;
        let offset = local - utc;
        if offset.num_seconds() % 60 != 0 || offset.subsec_nanos() != 0 {
            tracing::debug!(text, %offset, "time zone offset is not a whole number of minutes");
            return Err(Error::InvalidTimestamp);
        }
        Ok(opaque)
    }

    pub fn opaque_timestamp_tz_to_string(&self, timestamp: &OpaqueTimestampTz) -> Result<String> {
        if timestamp.utc_timestamp.time.0 >= TICKS_PER_DAY {
            return Err(Error::InvalidTimestamp);
        }
        let (date, time, zone) = self.util.decode_timestamp_tz(timestamp)?;
        Ok(format!("{} {} {}", format_date(date), format_time(time), zone))
    }

    /// Minutes the zone is ahead of UTC. Region zones are resolved on the
    /// TIME WITH TIME ZONE reference date.
    pub(crate) fn time_tz_offset_minutes(&self, time: &OpaqueTimeTz) -> Result<i16> {
        if time.time_zone <= TZ_OFFSET_ID_MAX {
            return Ok((time.time_zone as i32 - TZ_OFFSET_MAX_MINUTES) as i16);
        }
        let timestamp = OpaqueTimestampTz {
            utc_timestamp: OpaqueTimestamp::new(
                self.util.encode_date(reference_date_parts())?,
                time.utc_time,
            ),
            time_zone: time.time_zone,
        };
        self.timestamp_tz_offset_minutes(&timestamp).map_err(|err| match err {
            Error::InvalidTimestamp => Error::InvalidTime,
            other => other,
        })
    }

    /// Minutes the zone is ahead of UTC at the given instant.
    pub(crate) fn timestamp_tz_offset_minutes(
        &self,
        timestamp: &OpaqueTimestampTz,
    ) -> Result<i16> {
        let (date, time, _) = self.util.decode_timestamp_tz(timestamp)?;
        let local = valid_timestamp(date, time).ok_or(Error::InvalidTimestamp)?;
        let utc = self.opaque_timestamp_to_timestamp(&timestamp.utc_timestamp)?;
        i16::try_from((local - utc).num_minutes()).map_err(|_| Error::InvalidTimestamp)
    }
}

fn reference_date_parts() -> DateParts {
    let (year, month, day) = TIME_TZ_REFERENCE_DATE;
    DateParts::new(year, month, day)
}

fn valid_date(parts: DateParts) -> Option<NaiveDate> {
    if parts.year < 1 {
        return None;
    }
    parts.to_naive()
}

fn valid_time(parts: TimeParts) -> Option<NaiveTime> {
    if parts.hours >= 24 || parts.minutes >= 60 || parts.seconds >= 60 {
        return None;
    }
    parts.to_naive()
}

fn valid_timestamp(date: DateParts, time: TimeParts) -> Option<NaiveDateTime> {
    Some(valid_date(date)?.and_time(valid_time(time)?))
}

/// Decompose a time whose sub-second part is a whole number of ticks.
fn exact_time_parts(time: &NaiveTime) -> Option<TimeParts> {
    let nanos = time.nanosecond();
    if nanos >= 1_000_000_000 || nanos % NANOS_PER_TICK != 0 {
        return None;
    }
    Some(truncated_time_parts(time))
}

fn truncated_time_parts(time: &NaiveTime) -> TimeParts {
    TimeParts::new(
        time.hour(),
        time.minute(),
        time.second(),
        (time.nanosecond() / NANOS_PER_TICK).min(TICKS_PER_SECOND - 1),
    )
}

fn format_date(date: DateParts) -> String {
    format!("{:04}-{:02}-{:02}", date.year, date.month, date.day)
}

fn format_time(time: TimeParts) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:04}",
        time.hours, time.minutes, time.seconds, time.fractions
    )
}

/// Cursor over calendar text.
struct Scanner<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Scanner<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    /// Skip whitespace, returning how much was skipped.
    fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn expect(&mut self, c: u8) -> Option<()> {
        (self.peek() == Some(c)).then(|| self.pos += 1)
    }

    /// Read `min..=max` digits, stopping early at a non-digit.
    fn digits(&mut self, min: usize, max: usize) -> Option<(u32, usize)> {
        let mut value = 0u32;
        let mut count = 0;
        while count < max {
            match self.peek() {
                Some(c @ b'0'..=b'9') => {
                    value = value * 10 + (c - b'0') as u32;
                    count += 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        (count >= min).then_some((value, count))
    }

    /// The next field must not continue with another digit.
    fn field(&mut self, width: usize) -> Option<u32> {
        let (value, _) = self.digits(width, width)?;
        match self.peek() {
            Some(b'0'..=b'9') => None,
            _ => Some(value),
        }
    }

    fn date(&mut self) -> Option<DateParts> {
        self.skip_whitespace();
        let year = self.field(4)?;
        self.skip_whitespace();
        self.expect(b'-')?;
        self.skip_whitespace();
        let month = self.field(2)?;
        self.skip_whitespace();
        self.expect(b'-')?;
        self.skip_whitespace();
        let day = self.field(2)?;
        Some(DateParts::new(year as i32, month, day))
    }

    fn time(&mut self) -> Option<TimeParts> {
        self.skip_whitespace();
        let hours = self.field(2)?;
        self.skip_whitespace();
        self.expect(b':')?;
        self.skip_whitespace();
        let minutes = self.field(2)?;
        self.skip_whitespace();
        self.expect(b':')?;
        self.skip_whitespace();
        let seconds = self.field(2)?;

        let before_fraction = self.pos;
        self.skip_whitespace();
        let fractions = if self.expect(b'.').is_some() {
            self.skip_whitespace();
            let (value, count) = self.digits(1, 4)?;
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                return None;
            }
            value * 10u32.pow(4 - count as u32)
        } else {
            self.pos = before_fraction;
            0
        };

        Some(TimeParts::new(hours, minutes, seconds, fractions))
    }

    fn timestamp(&mut self) -> Option<(DateParts, TimeParts)> {
        let date = self.date()?;
        if self.skip_whitespace() == 0 {
            return None;
        }
        let time = self.time()?;
        Some((date, time))
    }

    /// Whitespace-separated zone name.
    fn zone(&mut self) -> Option<&'t str> {
        if self.skip_whitespace() == 0 {
            return None;
        }
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let text: &'t str = self.text;
        Some(&text[start..self.pos])
    }

    /// Only trailing whitespace may remain.
    fn finish(&mut self) -> bool {
        self.skip_whitespace();
        self.pos == self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::util::StandardEngineUtil;

    fn converter() -> CalendarConverter<'static> {
        static UTIL: StandardEngineUtil = StandardEngineUtil;
        CalendarConverter::new(&UTIL)
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn hms_ticks(hours: u32, minutes: u32, seconds: u32, ticks: u32) -> NaiveTime {
        NaiveTime::from_hms_nano_opt(hours, minutes, seconds, ticks * NANOS_PER_TICK).unwrap()
    }

    #[test]
    fn test_date_round_trip() {
        let c = converter();
        for date in [ymd(2024, 2, 29), ymd(1, 1, 1), ymd(9999, 12, 31), ymd(1858, 11, 17)] {
            let opaque = c.date_to_opaque_date(&date).unwrap();
            assert_eq!(c.opaque_date_to_date(opaque).unwrap(), date);
        }
        assert_eq!(c.date_to_opaque_date(&ymd(2024, 2, 29)).unwrap(), OpaqueDate(60369));
    }

    #[test]
    fn test_date_before_year_one() {
        let c = converter();
        assert_eq!(c.date_to_opaque_date(&ymd(0, 12, 31)), Err(Error::InvalidDate));
        let opaque = OpaqueDate(c.date_to_opaque_date(&ymd(1, 1, 1)).unwrap().0 - 1);
        assert_eq!(c.opaque_date_to_date(opaque), Err(Error::InvalidDate));
    }

    #[test]
    fn test_date_strings() {
        let c = converter();
        assert_eq!(c.string_to_date("2024-02-29").unwrap(), ymd(2024, 2, 29));
        assert_eq!(c.string_to_date(" 9999 - 12 - 31 ").unwrap(), ymd(9999, 12, 31));
        assert_eq!(c.string_to_date("0001-01-01").unwrap(), ymd(1, 1, 1));
        assert_eq!(c.date_to_string(&ymd(1, 1, 1)), "0001-01-01");
        assert_eq!(
            c.opaque_date_to_string(OpaqueDate(60369)).unwrap(),
            "2024-02-29"
        );
    }

    #[test]
    fn test_invalid_date_strings() {
        let c = converter();
        assert_eq!(c.string_to_date("2023-02-29"), Err(Error::InvalidDate));
        assert_eq!(c.string_to_date("2024-13-01"), Err(Error::InvalidDate));
        assert_eq!(c.string_to_date("0000-01-01"), Err(Error::InvalidDate));
        for text in ["2024-2-29", "24-02-29", "20245-02-29", "2024/02/29", "2024-02-29x", ""] {
            assert!(
                matches!(c.string_to_date(text), Err(Error::ConversionErrorFromString { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_time_strings() {
        let c = converter();
        assert_eq!(c.string_to_time("13:14:15.1234").unwrap(), hms_ticks(13, 14, 15, 1234));
        assert_eq!(c.string_to_time(" 23 : 59 : 59 . 9999 ").unwrap(), hms_ticks(23, 59, 59, 9999));
        assert_eq!(c.string_to_time("13:14:15.5").unwrap(), hms_ticks(13, 14, 15, 5000));
        assert_eq!(c.string_to_time("13:14:15").unwrap(), hms_ticks(13, 14, 15, 0));
        assert_eq!(c.time_to_string(&hms_ticks(13, 14, 15, 1234)), "13:14:15.1234");
        assert_eq!(c.time_to_string(&hms_ticks(1, 2, 3, 0)), "01:02:03.0000");
    }

    #[test]
    fn test_invalid_time_strings() {
        let c = converter();
        assert_eq!(c.string_to_time("24:00:00"), Err(Error::InvalidTime));
        assert_eq!(c.string_to_time("12:60:00"), Err(Error::InvalidTime));
        assert_eq!(c.string_to_time("12:00:60"), Err(Error::InvalidTime));
        for text in ["12:00:00.12345", "1:00:00", "12:00", "12:00:00.", "12:00:00 UTC"] {
            assert!(
                matches!(c.string_to_time(text), Err(Error::ConversionErrorFromString { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_time_sub_tick_precision() {
        let c = converter();
        let time = NaiveTime::from_hms_micro_opt(1, 2, 3, 50).unwrap();
        assert_eq!(c.time_to_opaque_time(&time), Err(Error::InvalidTime));
        assert_eq!(
            c.opaque_time_to_time(OpaqueTime(TICKS_PER_DAY)),
            Err(Error::InvalidTime)
        );
    }

    #[test]
    fn test_timestamp_strings() {
        let c = converter();
        let timestamp = ymd(2024, 2, 29).and_time(hms_ticks(13, 14, 15, 1234));
        assert_eq!(c.string_to_timestamp("2024-02-29 13:14:15.1234").unwrap(), timestamp);
        assert_eq!(c.timestamp_to_string(&timestamp), "2024-02-29 13:14:15.1234");

        let opaque = c.timestamp_to_opaque_timestamp(&timestamp).unwrap();
        assert_eq!(opaque.date, OpaqueDate(60369));
        assert_eq!(c.opaque_timestamp_to_string(&opaque).unwrap(), "2024-02-29 13:14:15.1234");

        assert_eq!(c.string_to_timestamp("2024-02-30 00:00:00"), Err(Error::InvalidTimestamp));
        assert_eq!(c.string_to_timestamp("2024-02-29 25:00:00"), Err(Error::InvalidTimestamp));
        assert!(matches!(
            c.string_to_timestamp("2024-02-2913:14:15"),
            Err(Error::ConversionErrorFromString { .. })
        ));
    }

    #[test]
    fn test_time_tz_offset_zone() {
        let c = converter();
        let value = c.string_to_time_tz("11:14:15.1234 -03:00").unwrap();
        assert_eq!(value, TimeTz::new(hms_ticks(14, 14, 15, 1234), "-03:00"));
        assert_eq!(c.time_tz_to_string(&value).unwrap(), "11:14:15.1234 -03:00");

        let value = c.string_to_time_tz("11:14:15.1234 +03:00").unwrap();
        assert_eq!(value.utc_time, hms_ticks(8, 14, 15, 1234));
        assert_eq!(c.time_tz_to_string(&value).unwrap(), "11:14:15.1234 +03:00");
    }

    #[test]
    fn test_time_tz_region_zone() {
        let c = converter();
        let value = c.string_to_time_tz("13:14:15.1234 America/Sao_Paulo").unwrap();
        assert_eq!(value.utc_time, hms_ticks(16, 14, 15, 1234));
        assert_eq!(value.zone, "America/Sao_Paulo");
        assert_eq!(
            c.time_tz_to_string(&value).unwrap(),
            "13:14:15.1234 America/Sao_Paulo"
        );
    }

    #[test]
    fn test_time_tz_errors() {
        let c = converter();
        assert!(matches!(
            c.string_to_time_tz("11:14:15.1234"),
            Err(Error::ConversionErrorFromString { .. })
        ));
        assert!(matches!(
            c.string_to_time_tz("11:14:15.1234 - 03:00"),
            Err(Error::ConversionErrorFromString { .. })
        ));
        assert!(matches!(
            c.string_to_time_tz("11:14:15 Nowhere/Special"),
            Err(Error::Engine(_))
        ));
    }

    #[test]
    fn test_timestamp_tz_strings() {
        let c = converter();
        for text in [
            "2024-02-29 13:14:15.1234 America/Sao_Paulo",
            "0001-01-01 13:14:15.1234 UTC",
            "2024-02-29 13:14:15.1234 -03:00",
            "9999-12-31 23:59:59.9999 America/Sao_Paulo",
        ] {
            let value = c.string_to_timestamp_tz(text).unwrap();
            assert_eq!(c.timestamp_tz_to_string(&value).unwrap(), text);
        }

        let value = c
            .string_to_timestamp_tz("2024-02-29 13:14:15.1234 America/Sao_Paulo")
            .unwrap();
        assert_eq!(
            value.utc_timestamp,
            ymd(2024, 2, 29).and_time(hms_ticks(16, 14, 15, 1234))
        );
    }

    #[test]
    fn test_timestamp_tz_past_year_9999_in_utc() {
        let c = converter();
        let opaque = c
            .string_to_opaque_timestamp_tz("9999-12-31 23:59:59.9999 America/Sao_Paulo")
            .unwrap();
        let value = c.opaque_timestamp_tz_to_timestamp_tz(&opaque).unwrap();
        assert_eq!(value.utc_timestamp.year(), 10000);
    }

    #[test]
    fn test_offsets_in_minutes() {
        let c = converter();
        let time = c.string_to_opaque_time_tz("11:00:00 -03:00").unwrap();
        assert_eq!(c.time_tz_offset_minutes(&time).unwrap(), -180);
        let timestamp = c
            .string_to_opaque_timestamp_tz("2024-07-01 12:00:00 Europe/Berlin")
            .unwrap();
        assert_eq!(c.timestamp_tz_offset_minutes(&timestamp).unwrap(), 120);
    }

    #[test]
    fn test_time_tz_offsets_east_of_twelve_hours() {
        let c = converter();
        for (text, minutes) in [
            ("12:00:00 +14:00", 840),
            ("00:30:00 +13:45", 825),
            ("23:00:00 -12:00", -720),
            ("12:00:00 Pacific/Kiritimati", 840),
            ("01:00:00 Pacific/Tongatapu", 780),
            ("12:00:00 Pacific/Pago_Pago", -660),
        ] {
            let time = c.string_to_opaque_time_tz(text).unwrap();
            assert_eq!(c.time_tz_offset_minutes(&time).unwrap(), minutes, "{text}");
        }
    }
}
