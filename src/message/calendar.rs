//! Calendar accessors. Each requires the exact calendar slot type; the
//! zone-aware ones also accept the `_EX` layouts, whose trailing offset is
//! derived from the zone on write.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::Message;
use crate::error::{Error, Result};
use crate::protocol::buffer::MessageBuffer;
use crate::protocol::convert::CalendarConverter;
use crate::protocol::types::{
    AdjustedType, Descriptor, OpaqueDate, OpaqueTime, OpaqueTimeTz, OpaqueTimestamp,
    OpaqueTimestampTz, TimeTz, TimestampTz,
};

pub(crate) fn read_opaque_date(desc: &Descriptor, buf: &MessageBuffer) -> Result<OpaqueDate> {
    Ok(OpaqueDate(buf.read_i32_le(desc.offset as usize)?))
}

pub(crate) fn read_opaque_time(desc: &Descriptor, buf: &MessageBuffer) -> Result<OpaqueTime> {
    Ok(OpaqueTime(buf.read_u32_le(desc.offset as usize)?))
}

pub(crate) fn read_opaque_timestamp(
    desc: &Descriptor,
    buf: &MessageBuffer,
) -> Result<OpaqueTimestamp> {
    let offset = desc.offset as usize;
    Ok(OpaqueTimestamp::new(
        OpaqueDate(buf.read_i32_le(offset)?),
        OpaqueTime(buf.read_u32_le(offset + 4)?),
    ))
}

pub(crate) fn read_opaque_time_tz(desc: &Descriptor, buf: &MessageBuffer) -> Result<OpaqueTimeTz> {
    let offset = desc.offset as usize;
    Ok(OpaqueTimeTz {
        utc_time: OpaqueTime(buf.read_u32_le(offset)?),
        time_zone: buf.read_u16_le(offset + 4)?,
    })
}

pub(crate) fn read_opaque_timestamp_tz(
    desc: &Descriptor,
    buf: &MessageBuffer,
) -> Result<OpaqueTimestampTz> {
    let offset = desc.offset as usize;
    Ok(OpaqueTimestampTz {
        utc_timestamp: OpaqueTimestamp::new(
            OpaqueDate(buf.read_i32_le(offset)?),
            OpaqueTime(buf.read_u32_le(offset + 4)?),
        ),
        time_zone: buf.read_u16_le(offset + 8)?,
    })
}

fn write_opaque_timestamp(
    desc: &Descriptor,
    buf: &mut MessageBuffer,
    value: &OpaqueTimestamp,
) -> Result<()> {
    let offset = desc.offset as usize;
    buf.write_i32_le(offset, value.date.0)?;
    buf.write_u32_le(offset + 4, value.time.0)
}

pub(crate) fn write_opaque_time_tz(
    desc: &Descriptor,
    converter: CalendarConverter<'_>,
    buf: &mut MessageBuffer,
    value: &OpaqueTimeTz,
) -> Result<()> {
    let offset = desc.offset as usize;
    let ext_offset = match desc.adjusted_type {
        AdjustedType::TimeTzEx => Some(converter.time_tz_offset_minutes(value)?),
        _ => None,
    };
    buf.write_u32_le(offset, value.utc_time.0)?;
    buf.write_u16_le(offset + 4, value.time_zone)?;
    match ext_offset {
        Some(minutes) => buf.write_i16_le(offset + 6, minutes),
        None => Ok(()),
    }
}

pub(crate) fn write_opaque_timestamp_tz(
    desc: &Descriptor,
    converter: CalendarConverter<'_>,
    buf: &mut MessageBuffer,
    value: &OpaqueTimestampTz,
) -> Result<()> {
    let offset = desc.offset as usize;
    let ext_offset = match desc.adjusted_type {
        AdjustedType::TimestampTzEx => Some(converter.timestamp_tz_offset_minutes(value)?),
        _ => None,
    };
    write_opaque_timestamp(desc, buf, &value.utc_timestamp)?;
    buf.write_u16_le(offset + 8, value.time_zone)?;
    match ext_offset {
        Some(minutes) => buf.write_i16_le(offset + 10, minutes),
        None => Ok(()),
    }
}

fn is_time_tz(adjusted_type: AdjustedType) -> bool {
    matches!(adjusted_type, AdjustedType::TimeTz | AdjustedType::TimeTzEx)
}

fn is_timestamp_tz(adjusted_type: AdjustedType) -> bool {
    matches!(
        adjusted_type,
        AdjustedType::TimestampTz | AdjustedType::TimestampTzEx
    )
}

fn expect_type(desc: &Descriptor, expected: AdjustedType, requested: &'static str) -> Result<()> {
    if desc.adjusted_type == expected {
        Ok(())
    } else {
        Err(Error::invalid_type(requested, desc.adjusted_type))
    }
}

impl Message {
    // --- DATE ---

    pub fn get_date(&self, index: usize) -> Result<Option<NaiveDate>> {
        self.read_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Date, "NaiveDate")?;
            converter.opaque_date_to_date(read_opaque_date(desc, buf)?)
        })
    }

    pub fn set_date(&mut self, index: usize, value: impl Into<Option<NaiveDate>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Date, "NaiveDate")?;
            let opaque = converter.date_to_opaque_date(&value)?;
            buf.write_i32_le(desc.offset as usize, opaque.0)
        })
    }

    pub fn get_opaque_date(&self, index: usize) -> Result<Option<OpaqueDate>> {
        self.read_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Date, "OpaqueDate")?;
            read_opaque_date(desc, buf)
        })
    }

    pub fn set_opaque_date(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueDate>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Date, "OpaqueDate")?;
            buf.write_i32_le(desc.offset as usize, value.0)
        })
    }

    // --- TIME ---

    pub fn get_time(&self, index: usize) -> Result<Option<NaiveTime>> {
        self.read_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Time, "NaiveTime")?;
            converter.opaque_time_to_time(read_opaque_time(desc, buf)?)
        })
    }

    pub fn set_time(&mut self, index: usize, value: impl Into<Option<NaiveTime>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Time, "NaiveTime")?;
            let opaque = converter.time_to_opaque_time(&value)?;
            buf.write_u32_le(desc.offset as usize, opaque.0)
        })
    }

    pub fn get_opaque_time(&self, index: usize) -> Result<Option<OpaqueTime>> {
        self.read_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Time, "OpaqueTime")?;
            read_opaque_time(desc, buf)
        })
    }

    pub fn set_opaque_time(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueTime>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Time, "OpaqueTime")?;
            buf.write_u32_le(desc.offset as usize, value.0)
        })
    }

    // --- TIMESTAMP ---

    pub fn get_timestamp(&self, index: usize) -> Result<Option<NaiveDateTime>> {
        self.read_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Timestamp, "NaiveDateTime")?;
            converter.opaque_timestamp_to_timestamp(&read_opaque_timestamp(desc, buf)?)
        })
    }

    pub fn set_timestamp(
        &mut self,
        index: usize,
        value: impl Into<Option<NaiveDateTime>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            expect_type(desc, AdjustedType::Timestamp, "NaiveDateTime")?;
            let opaque = converter.timestamp_to_opaque_timestamp(&value)?;
            write_opaque_timestamp(desc, buf, &opaque)
        })
    }

    pub fn get_opaque_timestamp(&self, index: usize) -> Result<Option<OpaqueTimestamp>> {
        self.read_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Timestamp, "OpaqueTimestamp")?;
            read_opaque_timestamp(desc, buf)
        })
    }

    pub fn set_opaque_timestamp(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueTimestamp>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            expect_type(desc, AdjustedType::Timestamp, "OpaqueTimestamp")?;
            write_opaque_timestamp(desc, buf, &value)
        })
    }

    // --- TIME WITH TIME ZONE ---

    pub fn get_time_tz(&self, index: usize) -> Result<Option<TimeTz>> {
        self.read_value(index, |desc, converter, buf| {
            if !is_time_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("TimeTz", desc.adjusted_type));
            }
            converter.opaque_time_tz_to_time_tz(&read_opaque_time_tz(desc, buf)?)
        })
    }

    pub fn set_time_tz(&mut self, index: usize, value: impl Into<Option<TimeTz>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            if !is_time_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("TimeTz", desc.adjusted_type));
            }
            let opaque = converter.time_tz_to_opaque_time_tz(&value)?;
            write_opaque_time_tz(desc, converter, buf, &opaque)
        })
    }

    pub fn get_opaque_time_tz(&self, index: usize) -> Result<Option<OpaqueTimeTz>> {
        self.read_value(index, |desc, _, buf| {
            if !is_time_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("OpaqueTimeTz", desc.adjusted_type));
            }
            read_opaque_time_tz(desc, buf)
        })
    }

    pub fn set_opaque_time_tz(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueTimeTz>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            if !is_time_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("OpaqueTimeTz", desc.adjusted_type));
            }
            write_opaque_time_tz(desc, converter, buf, &value)
        })
    }

    // --- TIMESTAMP WITH TIME ZONE ---

    pub fn get_timestamp_tz(&self, index: usize) -> Result<Option<TimestampTz>> {
        self.read_value(index, |desc, converter, buf| {
            if !is_timestamp_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("TimestampTz", desc.adjusted_type));
            }
            converter.opaque_timestamp_tz_to_timestamp_tz(&read_opaque_timestamp_tz(desc, buf)?)
        })
    }

    pub fn set_timestamp_tz(
        &mut self,
        index: usize,
        value: impl Into<Option<TimestampTz>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            if !is_timestamp_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("TimestampTz", desc.adjusted_type));
            }
            let opaque = converter.timestamp_tz_to_opaque_timestamp_tz(&value)?;
            write_opaque_timestamp_tz(desc, converter, buf, &opaque)
        })
    }

    pub fn get_opaque_timestamp_tz(&self, index: usize) -> Result<Option<OpaqueTimestampTz>> {
        self.read_value(index, |desc, _, buf| {
            if !is_timestamp_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("OpaqueTimestampTz", desc.adjusted_type));
            }
            read_opaque_timestamp_tz(desc, buf)
        })
    }

    pub fn set_opaque_timestamp_tz(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueTimestampTz>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            if !is_timestamp_tz(desc.adjusted_type) {
                return Err(Error::invalid_type("OpaqueTimestampTz", desc.adjusted_type));
            }
            write_opaque_timestamp_tz(desc, converter, buf, &value)
        })
    }
}
