//! Wire-level constants shared with the engine's client ABI.

// SQL type codes (XSQLVAR / IMessageMetadata::getType)
pub const SQL_TEXT: u32 = 452;
pub const SQL_VARYING: u32 = 448;
pub const SQL_SHORT: u32 = 500;
pub const SQL_LONG: u32 = 496;
pub const SQL_FLOAT: u32 = 482;
pub const SQL_DOUBLE: u32 = 480;
pub const SQL_TIMESTAMP: u32 = 510;
pub const SQL_BLOB: u32 = 520;
pub const SQL_TYPE_TIME: u32 = 560;
pub const SQL_TYPE_DATE: u32 = 570;
pub const SQL_INT64: u32 = 580;
pub const SQL_TIMESTAMP_TZ_EX: u32 = 32748;
pub const SQL_TIME_TZ_EX: u32 = 32750;
pub const SQL_INT128: u32 = 32752;
pub const SQL_TIMESTAMP_TZ: u32 = 32754;
pub const SQL_TIME_TZ: u32 = 32756;
pub const SQL_DEC16: u32 = 32760;
pub const SQL_DEC34: u32 = 32762;
pub const SQL_BOOLEAN: u32 = 32764;
pub const SQL_NULL: u32 = 32766;

/// Low bit of a raw type code marks a nullable column.
pub const SQL_NULLABLE_FLAG: u32 = 1;

// Null indicator values
pub const NULL_FLAG_TRUE: i16 = 1;
pub const NULL_FLAG_FALSE: i16 = 0;
pub const NULL_FLAG_SIZE: usize = 2;

/// Version of the width/alignment table in `layout`.
pub const LAYOUT_VERSION: u32 = 1;

// Calendar ticks
pub const TICKS_PER_SECOND: u32 = 10_000;
pub const TICKS_PER_MINUTE: u32 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: u32 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: u32 = 24 * TICKS_PER_HOUR;
pub const NANOS_PER_TICK: u32 = 100_000;

/// TIME WITH TIME ZONE resolves region offsets on this date.
pub const TIME_TZ_REFERENCE_DATE: (i32, u32, u32) = (2020, 1, 1);

// Time zone ids
pub const TZ_OFFSET_MAX_MINUTES: i32 = 23 * 60 + 59;
pub const TZ_OFFSET_ID_MAX: u16 = (2 * TZ_OFFSET_MAX_MINUTES) as u16;
pub const TZ_REGION_ID_MAX: u16 = u16::MAX;

// Engine utility status codes
pub const STATUS_INVALID_TIME_ZONE_REGION: u32 = 1;
pub const STATUS_INVALID_TIME_ZONE_OFFSET: u32 = 2;
pub const STATUS_INVALID_TIME_ZONE_ID: u32 = 3;
pub const STATUS_INVALID_DATE: u32 = 4;
pub const STATUS_INVALID_TIME: u32 = 5;
