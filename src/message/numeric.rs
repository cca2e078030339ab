//! Numeric accessors.
//!
//! Every numeric accessor accepts every numeric slot (INT16 through
//! DECFLOAT34) and converts through `Numeric`. Unscaled integer accessors
//! work at scale 0; scaled ones use the descriptor's scale and are limited to
//! exact slots when reading.

use super::Message;
use crate::error::{Error, Result};
use crate::protocol::buffer::MessageBuffer;
use crate::protocol::convert::numeric::Numeric;
use crate::protocol::types::{
    AdjustedType, DecFloat16, DecFloat34, Decimal128, Decimal64, Descriptor, OpaqueDecFloat16,
    OpaqueDecFloat34, ScaledInt128, ScaledInt16, ScaledInt32, ScaledInt64, ScaledNumber,
};

/// Decode a numeric slot.
pub(crate) fn read_numeric(
    desc: &Descriptor,
    buf: &MessageBuffer,
    requested: &'static str,
) -> Result<Numeric> {
    let offset = desc.offset as usize;
    let scale = desc.scale;
    Ok(match desc.adjusted_type {
        AdjustedType::Int16 => Numeric::Int16(ScaledNumber::new(buf.read_i16_le(offset)?, scale)),
        AdjustedType::Int32 => Numeric::Int32(ScaledNumber::new(buf.read_i32_le(offset)?, scale)),
        AdjustedType::Int64 => Numeric::Int64(ScaledNumber::new(buf.read_i64_le(offset)?, scale)),
        AdjustedType::Int128 => {
            Numeric::Int128(ScaledNumber::new(buf.read_i128_le(offset)?, scale))
        }
        AdjustedType::Float => Numeric::Float(buf.read_f32_le(offset)?),
        AdjustedType::Double => Numeric::Double(buf.read_f64_le(offset)?),
        AdjustedType::DecFloat16 => Numeric::DecFloat16(DecFloat16::from_opaque(
            OpaqueDecFloat16(buf.read_u64_le(offset)?),
        )?),
        AdjustedType::DecFloat34 => Numeric::DecFloat34(DecFloat34::from_opaque(
            OpaqueDecFloat34(buf.read_u128_le(offset)?),
        )?),
        other => return Err(Error::invalid_type(requested, other)),
    })
}

/// Encode `value` into a numeric slot, converting to the slot's type and
/// scale. Nothing is written if the conversion fails.
pub(crate) fn write_numeric(
    desc: &Descriptor,
    buf: &mut MessageBuffer,
    value: Numeric,
    requested: &'static str,
) -> Result<()> {
    let offset = desc.offset as usize;
    let scale = desc.scale;
    match desc.adjusted_type {
        AdjustedType::Int16 => buf.write_i16_le(offset, value.to_integer(scale)?),
        AdjustedType::Int32 => buf.write_i32_le(offset, value.to_integer(scale)?),
        AdjustedType::Int64 => buf.write_i64_le(offset, value.to_integer(scale)?),
        AdjustedType::Int128 => buf.write_i128_le(offset, value.to_integer(scale)?),
        AdjustedType::Float => buf.write_f32_le(offset, value.to_float()),
        AdjustedType::Double => buf.write_f64_le(offset, value.to_float()),
        AdjustedType::DecFloat16 => {
            let decfloat = value.to_decfloat::<Decimal64>()?;
            buf.write_u64_le(offset, decfloat.to_opaque().0)
        }
        AdjustedType::DecFloat34 => {
            let decfloat = value.to_decfloat::<Decimal128>()?;
            buf.write_u128_le(offset, decfloat.to_opaque().0)
        }
        other => Err(Error::invalid_type(requested, other)),
    }
}

macro_rules! integer_accessors {
    ($($ty:ty, $scaled:ty, $variant:ident, $name:literal, $scaled_name:literal:
        $get:ident, $set:ident, $get_scaled:ident, $set_scaled:ident;)*) => {
        impl Message {
            $(
                #[doc = concat!("Read as `", $name, "` at scale 0.")]
                pub fn $get(&self, index: usize) -> Result<Option<$ty>> {
                    self.read_value(index, |desc, _, buf| {
                        read_numeric(desc, buf, $name)?.to_integer(0)
                    })
                }

                #[doc = concat!("Write a `", $name, "` at scale 0.")]
                pub fn $set(&mut self, index: usize, value: impl Into<Option<$ty>>) -> Result<()> {
                    let Some(value) = value.into() else {
                        return self.set_null(index);
                    };
                    self.write_value(index, |desc, _, buf| {
                        let value = Numeric::$variant(ScaledNumber::new(value, 0));
                        write_numeric(desc, buf, value, $name)
                    })
                }

                #[doc = concat!("Read as `", $scaled_name, "` at the descriptor's scale.")]
                pub fn $get_scaled(&self, index: usize) -> Result<Option<$scaled>> {
                    self.read_value(index, |desc, _, buf| {
                        if !desc.adjusted_type.is_exact_numeric() {
                            return Err(Error::invalid_type($scaled_name, desc.adjusted_type));
                        }
                        let value = read_numeric(desc, buf, $scaled_name)?.to_integer(desc.scale)?;
                        Ok(ScaledNumber::new(value, desc.scale))
                    })
                }

                #[doc = concat!("Write a `", $scaled_name, "` rescaled to the slot.")]
                pub fn $set_scaled(
                    &mut self,
                    index: usize,
                    value: impl Into<Option<$scaled>>,
                ) -> Result<()> {
                    let Some(value) = value.into() else {
                        return self.set_null(index);
                    };
                    self.write_value(index, |desc, _, buf| {
                        write_numeric(desc, buf, Numeric::$variant(value), $scaled_name)
                    })
                }
            )*
        }
    };
}

integer_accessors! {
    i16, ScaledInt16, Int16, "i16", "ScaledInt16":
        get_i16, set_i16, get_scaled_i16, set_scaled_i16;
    i32, ScaledInt32, Int32, "i32", "ScaledInt32":
        get_i32, set_i32, get_scaled_i32, set_scaled_i32;
    i64, ScaledInt64, Int64, "i64", "ScaledInt64":
        get_i64, set_i64, get_scaled_i64, set_scaled_i64;
    i128, ScaledInt128, Int128, "i128", "ScaledInt128":
        get_i128, set_i128, get_scaled_i128, set_scaled_i128;
}

impl Message {
    pub fn get_f32(&self, index: usize) -> Result<Option<f32>> {
        self.read_value(index, |desc, _, buf| {
            Ok(read_numeric(desc, buf, "f32")?.to_float())
        })
    }

    pub fn set_f32(&mut self, index: usize, value: impl Into<Option<f32>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            write_numeric(desc, buf, Numeric::Float(value), "f32")
        })
    }

    pub fn get_f64(&self, index: usize) -> Result<Option<f64>> {
        self.read_value(index, |desc, _, buf| {
            Ok(read_numeric(desc, buf, "f64")?.to_float())
        })
    }

    pub fn set_f64(&mut self, index: usize, value: impl Into<Option<f64>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            write_numeric(desc, buf, Numeric::Double(value), "f64")
        })
    }

    pub fn get_decfloat16(&self, index: usize) -> Result<Option<DecFloat16>> {
        self.read_value(index, |desc, _, buf| {
            read_numeric(desc, buf, "DecFloat16")?.to_decfloat()
        })
    }

    pub fn set_decfloat16(
        &mut self,
        index: usize,
        value: impl Into<Option<DecFloat16>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            write_numeric(desc, buf, Numeric::DecFloat16(value), "DecFloat16")
        })
    }

    pub fn get_decfloat34(&self, index: usize) -> Result<Option<DecFloat34>> {
        self.read_value(index, |desc, _, buf| {
            read_numeric(desc, buf, "DecFloat34")?.to_decfloat()
        })
    }

    pub fn set_decfloat34(
        &mut self,
        index: usize,
        value: impl Into<Option<DecFloat34>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| {
            write_numeric(desc, buf, Numeric::DecFloat34(value), "DecFloat34")
        })
    }

    /// Read the raw decimal64 bits of a DECFLOAT(16) slot.
    pub fn get_opaque_decfloat16(&self, index: usize) -> Result<Option<OpaqueDecFloat16>> {
        self.read_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::DecFloat16 => {
                Ok(OpaqueDecFloat16(buf.read_u64_le(desc.offset as usize)?))
            }
            other => Err(Error::invalid_type("OpaqueDecFloat16", other)),
        })
    }

    pub fn set_opaque_decfloat16(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueDecFloat16>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::DecFloat16 => buf.write_u64_le(desc.offset as usize, value.0),
            other => Err(Error::invalid_type("OpaqueDecFloat16", other)),
        })
    }

    /// Read the raw decimal128 bits of a DECFLOAT(34) slot.
    pub fn get_opaque_decfloat34(&self, index: usize) -> Result<Option<OpaqueDecFloat34>> {
        self.read_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::DecFloat34 => {
                Ok(OpaqueDecFloat34(buf.read_u128_le(desc.offset as usize)?))
            }
            other => Err(Error::invalid_type("OpaqueDecFloat34", other)),
        })
    }

    pub fn set_opaque_decfloat34(
        &mut self,
        index: usize,
        value: impl Into<Option<OpaqueDecFloat34>>,
    ) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| match desc.adjusted_type {
            AdjustedType::DecFloat34 => buf.write_u128_le(desc.offset as usize, value.0),
            other => Err(Error::invalid_type("OpaqueDecFloat34", other)),
        })
    }

    /// Read any numeric slot as a `Numeric`.
    pub fn get_numeric(&self, index: usize) -> Result<Option<Numeric>> {
        self.read_value(index, |desc, _, buf| read_numeric(desc, buf, "Numeric"))
    }

    /// Write a `Numeric` into any numeric slot.
    pub fn set_numeric(&mut self, index: usize, value: impl Into<Option<Numeric>>) -> Result<()> {
        let Some(value) = value.into() else {
            return self.set_null(index);
        };
        self.write_value(index, |desc, _, buf| write_numeric(desc, buf, value, "Numeric"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::protocol::layout::MessageLayout;
    use crate::protocol::types::OriginalType;

    fn message() -> Message {
        let layout = MessageLayout::builder()
            .with_nullable_column(OriginalType::Short, 0, 2)
            .with_nullable_column(OriginalType::Long, -2, 4)
            .with_nullable_column(OriginalType::Int64, -4, 8)
            .with_nullable_column(OriginalType::Int128, 0, 16)
            .with_nullable_column(OriginalType::Float, 0, 4)
            .with_nullable_column(OriginalType::Double, 0, 8)
            .with_nullable_column(OriginalType::Dec16, 0, 8)
            .with_nullable_column(OriginalType::Dec34, 0, 16)
            .with_nullable_column(OriginalType::Boolean, 0, 1)
            .build()
            .unwrap();
        Message::new(Arc::new(layout))
    }

    #[test]
    fn test_unscaled_into_scaled_slot() {
        let mut m = message();
        m.set_i32(1, 12).unwrap();
        assert_eq!(m.as_bytes()[m.descriptor(1).unwrap().offset as usize], 0xB0);
        assert_eq!(m.get_scaled_i32(1).unwrap(), Some(ScaledNumber::new(1200, -2)));
        assert_eq!(m.get_i32(1).unwrap(), Some(12));
        assert_eq!(m.get_f64(1).unwrap(), Some(12.0));
    }

    #[test]
    fn test_scaled_rounding() {
        let mut m = message();
        m.set_scaled_i64(1, ScaledNumber::new(12345, -3)).unwrap();
        assert_eq!(m.get_scaled_i32(1).unwrap(), Some(ScaledNumber::new(1235, -2)));
        m.set_scaled_i64(1, ScaledNumber::new(-12345, -3)).unwrap();
        assert_eq!(m.get_scaled_i32(1).unwrap(), Some(ScaledNumber::new(-1235, -2)));
        assert_eq!(m.get_i16(1).unwrap(), Some(-12));
    }

    #[test]
    fn test_overflow_leaves_slot_null() {
        let mut m = message();
        assert_eq!(m.set_i32(0, 32768), Err(Error::NumericRange));
        assert!(m.is_null(0).unwrap());
        m.set_i32(0, 32767).unwrap();
        assert_eq!(m.get_i16(0).unwrap(), Some(i16::MAX));
    }

    #[test]
    fn test_scaled_getter_rejects_float_slots() {
        let mut m = message();
        m.set_f64(5, 1.5).unwrap();
        assert!(matches!(
            m.get_scaled_i64(5),
            Err(Error::InvalidType { requested: "ScaledInt64", actual: AdjustedType::Double })
        ));
        assert_eq!(m.get_i64(5).unwrap(), Some(2));
    }

    #[test]
    fn test_float_slots() {
        let mut m = message();
        m.set_f32(4, 12.3).unwrap();
        assert_eq!(m.get_i32(4).unwrap(), Some(12));
        m.set_scaled_i32(4, ScaledNumber::new(125, -1)).unwrap();
        assert_eq!(m.get_f32(4).unwrap(), Some(12.5));
        m.set_f64(5, f64::NAN).unwrap();
        assert_eq!(m.get_i32(5), Err(Error::NumericRange));
    }

    #[test]
    fn test_decfloat_slots() {
        let mut m = message();
        m.set_scaled_i32(6, ScaledNumber::new(-750, -2)).unwrap();
        assert_eq!(
            m.get_opaque_decfloat16(6).unwrap(),
            Some(OpaqueDecFloat16(0xA2300000000003D0))
        );
        assert_eq!(m.get_string(6).unwrap(), Some("-7.50".to_string()));
        assert_eq!(m.get_i32(6).unwrap(), Some(-8));

        m.set_i128(7, i128::MAX).unwrap();
        assert_eq!(
            m.get_decfloat34(7).unwrap().unwrap().to_string(),
            "1.701411834604692317316873037158841E+38"
        );
        m.set_decfloat34(7, "2E+38".parse::<DecFloat34>().unwrap()).unwrap();
        assert_eq!(m.get_i128(7), Err(Error::NumericRange));

        m.set_opaque_decfloat16(6, OpaqueDecFloat16(0x2238000000000001)).unwrap();
        assert_eq!(m.get_i64(6).unwrap(), Some(1));
        assert!(m.set_opaque_decfloat16(7, OpaqueDecFloat16(0)).is_err());
    }

    #[test]
    fn test_int128_slot() {
        let mut m = message();
        m.set_i128(3, i128::MIN).unwrap();
        assert_eq!(m.get_i128(3).unwrap(), Some(i128::MIN));
        assert_eq!(m.get_i64(3), Err(Error::NumericRange));
        m.set_i16(3, -5).unwrap();
        assert_eq!(m.get_numeric(3).unwrap(), Some(Numeric::Int128(ScaledNumber::new(-5, 0))));
    }

    #[test]
    fn test_numeric_on_boolean_slot() {
        let mut m = message();
        assert!(matches!(
            m.set_i32(8, 1),
            Err(Error::InvalidType { requested: "i32", actual: AdjustedType::Boolean })
        ));
        m.set_bool(8, true).unwrap();
        assert!(matches!(
            m.get_f64(8),
            Err(Error::InvalidType { requested: "f64", .. })
        ));
    }

    #[test]
    fn test_null_round_trip() {
        let mut m = message();
        m.set_i64(2, 5).unwrap();
        m.set_i64(2, None).unwrap();
        assert_eq!(m.get_i64(2).unwrap(), None);
        assert_eq!(m.get_scaled_i64(2).unwrap(), None);
    }
}
