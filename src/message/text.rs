//! Text accessors: the generic path through every conversion.

use super::calendar::{
    read_opaque_date, read_opaque_time, read_opaque_time_tz, read_opaque_timestamp,
    read_opaque_timestamp_tz, write_opaque_time_tz, write_opaque_timestamp_tz,
};
use super::numeric::{read_numeric, write_numeric};
use super::Message;
use crate::error::{Error, Result};
use crate::protocol::convert::numeric::{
    number_to_number, string_to_boolean, string_to_double, string_to_scaled, Numeric,
};
use crate::protocol::types::{AdjustedType, DecFloat34, ScaledNumber};

impl Message {
    /// Read any slot except BLOB and NULL as text.
    ///
    /// Exact numerics render at the descriptor's scale, booleans as
    /// `true`/`false`, calendar values in their canonical text form.
    pub fn get_string(&self, index: usize) -> Result<Option<String>> {
        self.read_value(index, |desc, converter, buf| match desc.adjusted_type {
            AdjustedType::Boolean => Ok(if buf.read_u8(desc.offset as usize)? != 0 {
                "true".to_string()
            } else {
                "false".to_string()
            }),
            AdjustedType::Int16
            | AdjustedType::Int32
            | AdjustedType::Int64
            | AdjustedType::Int128
            | AdjustedType::Float
            | AdjustedType::Double
            | AdjustedType::DecFloat16
            | AdjustedType::DecFloat34 => Ok(read_numeric(desc, buf, "String")?.to_string()),
            AdjustedType::Date => converter.opaque_date_to_string(read_opaque_date(desc, buf)?),
            AdjustedType::Time => converter.opaque_time_to_string(read_opaque_time(desc, buf)?),
            AdjustedType::Timestamp => {
                converter.opaque_timestamp_to_string(&read_opaque_timestamp(desc, buf)?)
            }
            AdjustedType::TimeTz | AdjustedType::TimeTzEx => {
                converter.opaque_time_tz_to_string(&read_opaque_time_tz(desc, buf)?)
            }
            AdjustedType::TimestampTz | AdjustedType::TimestampTzEx => {
                converter.opaque_timestamp_tz_to_string(&read_opaque_timestamp_tz(desc, buf)?)
            }
            AdjustedType::String => {
                Ok(String::from_utf8_lossy(buf.read_varying(desc.offset as usize)?).into_owned())
            }
            AdjustedType::Text => {
                let bytes = buf.read_bytes(desc.offset as usize, desc.length as usize)?;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            other @ (AdjustedType::Blob | AdjustedType::Null) => {
                Err(Error::invalid_type("String", other))
            }
        })
    }

    /// Write text into any slot except BLOB and NULL, parsing it as the
    /// slot's type.
    ///
    /// Returns `StringTruncation` if the text is longer than a character
    /// slot's declared length. CHAR slots are padded with spaces.
    pub fn set_string<'s>(
        &mut self,
        index: usize,
        value: impl Into<Option<&'s str>>,
    ) -> Result<()> {
        let Some(text) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, converter, buf| {
            let offset = desc.offset as usize;
            match desc.adjusted_type {
                AdjustedType::Boolean => buf.write_u8(offset, string_to_boolean(text)? as u8),
                AdjustedType::Int16
                | AdjustedType::Int32
                | AdjustedType::Int64
                | AdjustedType::Int128 => {
                    let scaled = string_to_scaled(text)?;
                    let value = number_to_number::<i128, i128>(scaled, desc.scale)?;
                    write_numeric(
                        desc,
                        buf,
                        Numeric::Int128(ScaledNumber::new(value, desc.scale)),
                        "String",
                    )
                }
                AdjustedType::Float | AdjustedType::Double => {
                    write_numeric(desc, buf, Numeric::Double(string_to_double(text)?), "String")
                }
                AdjustedType::DecFloat16 | AdjustedType::DecFloat34 => {
                    let value: DecFloat34 = text.parse()?;
                    write_numeric(desc, buf, Numeric::DecFloat34(value), "String")
                }
                AdjustedType::Date => {
                    let opaque = converter.string_to_opaque_date(text)?;
                    buf.write_i32_le(offset, opaque.0)
                }
                AdjustedType::Time => {
                    let opaque = converter.string_to_opaque_time(text)?;
                    buf.write_u32_le(offset, opaque.0)
                }
                AdjustedType::Timestamp => {
                    let opaque = converter.string_to_opaque_timestamp(text)?;
                    buf.write_i32_le(offset, opaque.date.0)?;
                    buf.write_u32_le(offset + 4, opaque.time.0)
                }
                AdjustedType::TimeTz | AdjustedType::TimeTzEx => {
                    let opaque = converter.string_to_opaque_time_tz(text)?;
                    write_opaque_time_tz(desc, converter, buf, &opaque)
                }
                AdjustedType::TimestampTz | AdjustedType::TimestampTzEx => {
                    let opaque = converter.string_to_opaque_timestamp_tz(text)?;
                    write_opaque_timestamp_tz(desc, converter, buf, &opaque)
                }
                AdjustedType::String | AdjustedType::Text => {
                    let bytes = text.as_bytes();
                    if bytes.len() > desc.length as usize {
                        return Err(Error::StringTruncation {
                            length: bytes.len(),
                            max_length: desc.length,
                        });
                    }
                    if desc.adjusted_type == AdjustedType::String {
                        return buf.write_varying(offset, bytes);
                    }
                    let mut padded = bytes.to_vec();
                    padded.resize(desc.length as usize, b' ');
                    buf.write_bytes(offset, &padded)
                }
                other @ (AdjustedType::Blob | AdjustedType::Null) => {
                    Err(Error::invalid_type("String", other))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::protocol::layout::MessageLayout;
    use crate::protocol::types::{Descriptor, OriginalType, Value};

    fn message() -> Message {
        let layout = MessageLayout::builder()
            .with_nullable_column(OriginalType::Varying, 0, 5)
            .with_nullable_column(OriginalType::Int64, -2, 8)
            .with_nullable_column(OriginalType::Boolean, 0, 1)
            .with_nullable_column(OriginalType::Double, 0, 8)
            .with_nullable_column(OriginalType::Dec34, 0, 16)
            .with_nullable_column(OriginalType::Date, 0, 4)
            .with_nullable_column(OriginalType::Blob, 0, 8)
            .with_nullable_column(OriginalType::Text, 0, 4)
            .with_nullable_column(OriginalType::Short, 1, 2)
            .build()
            .unwrap();
        Message::new(Arc::new(layout))
    }

    #[test]
    fn test_string_slot() {
        let mut m = message();
        m.set_string(0, "héllo").unwrap_err();
        m.set_string(0, "hell").unwrap();
        assert_eq!(m.get_string(0).unwrap(), Some("hell".to_string()));
        assert_eq!(
            m.set_string(0, "123456"),
            Err(Error::StringTruncation {
                length: 6,
                max_length: 5
            })
        );
        assert!(m.is_null(0).unwrap());
    }

    #[test]
    fn test_text_column_is_varying() {
        let mut m = message();
        m.set_string(7, "ab").unwrap();
        let offset = m.descriptor(7).unwrap().offset as usize;
        assert_eq!(&m.as_bytes()[offset..offset + 4], &[2, 0, b'a', b'b']);
        assert_eq!(m.get_string(7).unwrap(), Some("ab".to_string()));
    }

    #[test]
    fn test_engine_char_slot_is_fixed_width() {
        let layout = MessageLayout::new(
            vec![Descriptor::new(OriginalType::Text, 0, 4, 0, 6, true)],
            8,
        )
        .unwrap();
        let mut bytes = vec![0u8; 8];
        bytes[..4].copy_from_slice(b"abcd");
        let mut m = Message::from_bytes(Arc::new(layout), &bytes).unwrap();
        assert_eq!(m.get_string(0).unwrap(), Some("abcd".to_string()));
        assert_eq!(m.get_value(0).unwrap(), Value::String("abcd".to_string()));

        m.set_string(0, "xy").unwrap();
        assert_eq!(&m.as_bytes()[..4], b"xy  ");
        assert_eq!(m.get_string(0).unwrap(), Some("xy  ".to_string()));
        assert!(matches!(
            m.set_string(0, "vwxyz"),
            Err(Error::StringTruncation { length: 5, max_length: 4 })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut m = message();
        m.set_string(0, "ab").unwrap();
        let offset = m.descriptor(0).unwrap().offset as usize;
        let mut bytes = m.as_bytes().to_vec();
        bytes[offset + 2] = 0xFF;
        let m = Message::from_bytes(m.layout().clone(), &bytes).unwrap();
        assert_eq!(m.get_string(0).unwrap(), Some("\u{FFFD}b".to_string()));
    }

    #[test]
    fn test_exact_numeric_text() {
        let mut m = message();
        m.set_string(1, "-12.345").unwrap();
        assert_eq!(m.get_scaled_i64(1).unwrap(), Some(ScaledNumber::new(-1235, -2)));
        assert_eq!(m.get_string(1).unwrap(), Some("-12.35".to_string()));

        m.set_string(1, " 7 ").unwrap();
        assert_eq!(m.get_string(1).unwrap(), Some("7.00".to_string()));

        assert!(matches!(
            m.set_string(1, "1,5"),
            Err(Error::ConversionErrorFromString { .. })
        ));

        m.set_string(8, "125").unwrap();
        assert_eq!(m.get_scaled_i16(8).unwrap(), Some(ScaledNumber::new(13, 1)));
        assert_eq!(m.get_string(8).unwrap(), Some("130".to_string()));
    }

    #[test]
    fn test_boolean_text() {
        let mut m = message();
        m.set_string(2, " TRUE ").unwrap();
        assert_eq!(m.get_string(2).unwrap(), Some("true".to_string()));
        assert!(matches!(
            m.set_string(2, "yes"),
            Err(Error::ConversionErrorFromString { .. })
        ));
    }

    #[test]
    fn test_float_and_decfloat_text() {
        let mut m = message();
        m.set_string(3, "1.5e3").unwrap();
        assert_eq!(m.get_f64(3).unwrap(), Some(1500.0));
        assert_eq!(m.get_string(3).unwrap(), Some("1500".to_string()));

        m.set_string(4, "-7.50").unwrap();
        assert_eq!(m.get_string(4).unwrap(), Some("-7.50".to_string()));
        assert!(m.set_string(4, "abc").is_err());
    }

    #[test]
    fn test_date_text() {
        let mut m = message();
        m.set_string(5, " 9999 - 12 - 31 ").unwrap();
        assert_eq!(m.get_string(5).unwrap(), Some("9999-12-31".to_string()));
        assert_eq!(m.set_string(5, "2023-02-29"), Err(Error::InvalidDate));
    }

    #[test]
    fn test_blob_rejects_text() {
        let mut m = message();
        assert!(matches!(
            m.set_string(6, "x"),
            Err(Error::InvalidType { requested: "String", actual: AdjustedType::Blob })
        ));
        m.set_blob_id(6, crate::protocol::types::BlobId::new(1, 1)).unwrap();
        assert!(matches!(
            m.get_string(6),
            Err(Error::InvalidType { requested: "String", .. })
        ));
    }
}
