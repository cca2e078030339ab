//! DECFLOAT(16) and DECFLOAT(34) values.
//!
//! A value is kept as sign, integer coefficient and base-10 exponent, with
//! the coefficient limited to the format's digit count and the exponent to
//! the IEEE 754 range of decimal64 / decimal128. Arithmetic results are
//! rounded half away from zero.
//!
//! On the wire the engine stores these as IEEE 754 decimal64 / decimal128
//! bit patterns using densely packed decimal (DPD) coefficient encoding,
//! little-endian. Only finite values are supported; infinities and NaNs
//! decode to `Error::NumericRange`.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parameters of an IEEE 754 decimal interchange format.
pub trait DecimalFormat:
    Copy + Clone + fmt::Debug + PartialEq + Eq + Hash + Default + Send + Sync + 'static
{
    /// Significant decimal digits.
    const DIGITS: u32;
    /// Exponent bias; also the negated minimum exponent.
    const BIAS: i32;
    /// Width of the exponent continuation field in bits.
    const EXPONENT_CONTINUATION_BITS: u32;
    /// SQL type name, used in diagnostics.
    const NAME: &'static str;
}

/// IEEE 754 decimal64: 16 digits, exponent -398..=369.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal64;

impl DecimalFormat for Decimal64 {
    const DIGITS: u32 = 16;
    const BIAS: i32 = 398;
    const EXPONENT_CONTINUATION_BITS: u32 = 8;
    const NAME: &'static str = "DecFloat16";
}

/// IEEE 754 decimal128: 34 digits, exponent -6176..=6111.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal128;

impl DecimalFormat for Decimal128 {
    const DIGITS: u32 = 34;
    const BIAS: i32 = 6176;
    const EXPONENT_CONTINUATION_BITS: u32 = 12;
    const NAME: &'static str = "DecFloat34";
}

/// Finite decimal floating-point value in format `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecFloat<F: DecimalFormat> {
    negative: bool,
    coefficient: u128,
    exponent: i32,
    format: PhantomData<F>,
}

pub type DecFloat16 = DecFloat<Decimal64>;
pub type DecFloat34 = DecFloat<Decimal128>;

/// DECFLOAT(16) in engine encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueDecFloat16(pub u64);

/// DECFLOAT(34) in engine encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpaqueDecFloat34(pub u128);

/// Number of decimal digits in `value` (1 for zero).
pub(crate) fn digit_count(value: u128) -> u32 {
    match value.checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

/// Divide by `10^places`, rounding the quotient half away from zero.
/// `places` must be at most 38.
fn div_pow10_half_up(value: u128, places: u32) -> u128 {
    if places == 0 {
        return value;
    }
    let divisor = 10u128.pow(places);
    let quotient = value / divisor;
    if value % divisor >= divisor / 2 {
        quotient + 1
    } else {
        quotient
    }
}

impl<F: DecimalFormat> DecFloat<F> {
    const DECLETS: u32 = (F::DIGITS - 1) / 3;
    const TOTAL_BITS: u32 = 1 + 5 + F::EXPONENT_CONTINUATION_BITS + 10 * Self::DECLETS;
    const MAX_BIASED_EXPONENT: i32 = (3 << F::EXPONENT_CONTINUATION_BITS) - 1;

    /// Smallest exponent of the format.
    pub const MIN_EXPONENT: i32 = -F::BIAS;
    /// Largest exponent of the format.
    pub const MAX_EXPONENT: i32 = Self::MAX_BIASED_EXPONENT - F::BIAS;

    /// Positive zero with exponent 0.
    pub fn zero() -> Self {
        Self {
            negative: false,
            coefficient: 0,
            exponent: 0,
            format: PhantomData,
        }
    }

    /// Build `(-1)^negative * coefficient * 10^exponent`, rounding to the
    /// format's digits.
    ///
    /// Fails with `NumericRange` when the exponent overflows the format;
    /// exponent underflow rounds toward zero.
    pub fn from_parts(negative: bool, coefficient: u128, exponent: i64) -> Result<Self> {
        let mut coefficient = coefficient;
        let mut exponent = exponent;

        let digits = digit_count(coefficient);
        if digits > F::DIGITS {
            let drop = digits - F::DIGITS;
            coefficient = div_pow10_half_up(coefficient, drop);
            exponent += drop as i64;
            if digit_count(coefficient) > F::DIGITS {
                coefficient /= 10;
                exponent += 1;
            }
        }

        let min = Self::MIN_EXPONENT as i64;
        let max = Self::MAX_EXPONENT as i64;

        if coefficient == 0 {
            exponent = exponent.clamp(min, max);
        } else {
            // Fold excess exponent into the coefficient while it has room.
            while exponent > max && digit_count(coefficient) < F::DIGITS {
                coefficient *= 10;
                exponent -= 1;
            }
            if exponent > max {
                return Err(Error::NumericRange);
            }
            if exponent < min {
                let drop = min - exponent;
                coefficient = if drop > digit_count(coefficient) as i64 {
                    0
                } else {
                    coefficient / 10u128.pow(drop as u32)
                };
                exponent = min;
            }
        }

        Ok(Self {
            negative,
            coefficient,
            exponent: exponent as i32,
            format: PhantomData,
        })
    }

    /// Build from an exact scaled integer, rounding to the format's digits.
    pub fn from_scaled(value: i128, scale: i32) -> Result<Self> {
        Self::from_parts(value < 0, value.unsigned_abs(), scale as i64)
    }

    /// Convert to another decimal format, rounding when narrowing.
    pub fn to_format<G: DecimalFormat>(&self) -> Result<DecFloat<G>> {
        DecFloat::<G>::from_parts(self.negative, self.coefficient, self.exponent as i64)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient == 0
    }

    pub fn coefficient(&self) -> u128 {
        self.coefficient
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Encode as an IEEE 754 DPD bit pattern, right-aligned in a `u128`.
    pub(crate) fn to_bits(&self) -> u128 {
        let ecb = F::EXPONENT_CONTINUATION_BITS;
        let biased = (self.exponent + F::BIAS) as u128;
        let low_digits = 10u128.pow(F::DIGITS - 1);
        let msd = self.coefficient / low_digits;
        let mut rest = self.coefficient % low_digits;

        let exponent_msb = biased >> ecb;
        let combination = if msd < 8 {
            (exponent_msb << 3) | msd
        } else {
            0b11000 | (exponent_msb << 1) | (msd & 1)
        };

        let mut bits = 0u128;
        for i in 0..Self::DECLETS {
            let declet = DPD_ENCODE[(rest % 1000) as usize] as u128;
            bits |= declet << (10 * i);
            rest /= 1000;
        }

        let continuation_shift = 10 * Self::DECLETS;
        bits |= (biased & ((1 << ecb) - 1)) << continuation_shift;
        bits |= combination << (continuation_shift + ecb);
        if self.negative {
            bits |= 1 << (Self::TOTAL_BITS - 1);
        }
        bits
    }

    /// Decode an IEEE 754 DPD bit pattern.
    pub(crate) fn from_bits(bits: u128) -> Result<Self> {
        let ecb = F::EXPONENT_CONTINUATION_BITS;
        let continuation_shift = 10 * Self::DECLETS;
        let negative = (bits >> (Self::TOTAL_BITS - 1)) & 1 == 1;
        let combination = (bits >> (continuation_shift + ecb)) & 0x1F;

        if combination >> 1 == 0b1111 {
            tracing::debug!("{} special value {:#x} is not supported", F::NAME, bits);
            return Err(Error::NumericRange);
        }

        let (exponent_msb, msd) = if combination >> 3 == 0b11 {
            ((combination >> 1) & 0b11, 8 + (combination & 1))
        } else {
            (combination >> 3, combination & 0b111)
        };
        let continuation = (bits >> continuation_shift) & ((1 << ecb) - 1);
        let biased = ((exponent_msb << ecb) | continuation) as i32;
        if biased > Self::MAX_BIASED_EXPONENT {
            return Err(Error::NumericRange);
        }

        let mut coefficient = msd;
        for i in (0..Self::DECLETS).rev() {
            let declet = ((bits >> (10 * i)) & 0x3FF) as u16;
            coefficient = coefficient * 1000 + dpd_decode(declet) as u128;
        }

        Ok(Self {
            negative,
            coefficient,
            exponent: biased - F::BIAS,
            format: PhantomData,
        })
    }
}

impl DecFloat16 {
    /// Engine encoding of this value.
    pub fn to_opaque(&self) -> OpaqueDecFloat16 {
        OpaqueDecFloat16(self.to_bits() as u64)
    }

    /// Decode the engine encoding.
    pub fn from_opaque(opaque: OpaqueDecFloat16) -> Result<Self> {
        Self::from_bits(opaque.0 as u128)
    }
}

impl DecFloat34 {
    /// Engine encoding of this value.
    pub fn to_opaque(&self) -> OpaqueDecFloat34 {
        OpaqueDecFloat34(self.to_bits())
    }

    /// Decode the engine encoding.
    pub fn from_opaque(opaque: OpaqueDecFloat34) -> Result<Self> {
        Self::from_bits(opaque.0)
    }
}

impl<F: DecimalFormat> FromStr for DecFloat<F> {
    type Err = Error;

    /// Parse `[sign] digits [. digits] [(e|E) [sign] digits]`.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::conversion_from_string(text);
        let bytes = text.trim().as_bytes();
        let mut pos = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };

        // 38 significant digits always fit a u128; later digits cannot
        // change a half-up rounding to at most 34 digits.
        let mut coefficient: u128 = 0;
        let mut significant = 0u32;
        let mut exponent: i64 = 0;
        let mut seen_digit = false;
        let mut seen_point = false;

        while pos < bytes.len() {
            match bytes[pos] {
                c @ b'0'..=b'9' => {
                    seen_digit = true;
                    if significant < 38 {
                        if coefficient != 0 || c != b'0' {
                            significant += 1;
                        }
                        coefficient = coefficient * 10 + (c - b'0') as u128;
                        if seen_point {
                            exponent -= 1;
                        }
                    } else if !seen_point {
                        exponent += 1;
                    }
                }
                b'.' if !seen_point => seen_point = true,
                _ => break,
            }
            pos += 1;
        }

        if !seen_digit {
            return Err(invalid());
        }

        if pos < bytes.len() {
            if !matches!(bytes[pos], b'e' | b'E') {
                return Err(invalid());
            }
            pos += 1;
            let exponent_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            if pos >= bytes.len() {
                return Err(invalid());
            }
            let mut value: i64 = 0;
            for &c in &bytes[pos..] {
                if !c.is_ascii_digit() {
                    return Err(invalid());
                }
                value = (value * 10 + (c - b'0') as i64).min(1_000_000_000);
            }
            exponent += if exponent_negative { -value } else { value };
        }

        Self::from_parts(negative, coefficient, exponent)
    }
}

impl<F: DecimalFormat> fmt::Display for DecFloat<F> {
    /// Formats using the IEEE to-scientific-string rules: plain notation
    /// when the exponent is not positive and the adjusted exponent is at
    /// least -6, scientific otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.coefficient.to_string();
        let exponent = self.exponent as i64;
        let adjusted = exponent + digits.len() as i64 - 1;

        if self.negative {
            write!(f, "-")?;
        }

        if exponent <= 0 && adjusted >= -6 {
            if exponent == 0 {
                return write!(f, "{}", digits);
            }
            let point = digits.len() as i64 + exponent;
            if point > 0 {
                let (int_part, frac_part) = digits.split_at(point as usize);
                write!(f, "{}.{}", int_part, frac_part)
            } else {
                write!(f, "0.{}{}", "0".repeat((-point) as usize), digits)
            }
        } else {
            let (first, rest) = digits.split_at(1);
            write!(f, "{}", first)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest)?;
            }
            write!(f, "E{}{}", if adjusted < 0 { '-' } else { '+' }, adjusted.abs())
        }
    }
}

/// DPD encoding of every three-digit group.
static DPD_ENCODE: [u16; 1000] = build_dpd_encode_table();

const fn dpd_encode(value: u16) -> u16 {
    let d2 = value / 100;
    let d1 = (value / 10) % 10;
    let d0 = value % 10;

    let (a, b, c, d) = ((d2 >> 3) & 1, (d2 >> 2) & 1, (d2 >> 1) & 1, d2 & 1);
    let (e, f, g, h) = ((d1 >> 3) & 1, (d1 >> 2) & 1, (d1 >> 1) & 1, d1 & 1);
    let (i, j, k, m) = ((d0 >> 3) & 1, (d0 >> 2) & 1, (d0 >> 1) & 1, d0 & 1);

    // Declet bits p q r | s t u | v | w x y, selected by which digits are 8 or 9.
    let (p, q, r, s, t, u, v, w, x) = match (a, e, i) {
        (0, 0, 0) => (b, c, d, f, g, h, 0, j, k),
        (0, 0, 1) => (b, c, d, f, g, h, 1, 0, 0),
        (0, 1, 0) => (b, c, d, j, k, h, 1, 0, 1),
        (0, 1, 1) => (b, c, d, 1, 0, h, 1, 1, 1),
        (1, 0, 0) => (j, k, d, f, g, h, 1, 1, 0),
        (1, 0, 1) => (f, g, d, 0, 1, h, 1, 1, 1),
        (1, 1, 0) => (j, k, d, 0, 0, h, 1, 1, 1),
        _ => (0, 0, d, 1, 1, h, 1, 1, 1),
    };

    (p << 9)
        | (q << 8)
        | (r << 7)
        | (s << 6)
        | (t << 5)
        | (u << 4)
        | (v << 3)
        | (w << 2)
        | (x << 1)
        | m
}

const fn build_dpd_encode_table() -> [u16; 1000] {
    let mut table = [0u16; 1000];
    let mut n = 0;
    while n < 1000 {
        table[n] = dpd_encode(n as u16);
        n += 1;
    }
    table
}

/// Decode one 10-bit declet into its three-digit value.
fn dpd_decode(declet: u16) -> u16 {
    let bit = |n: u16| (declet >> n) & 1;
    let (p, q, r) = (bit(9), bit(8), bit(7));
    let (s, t, u) = (bit(6), bit(5), bit(4));
    let (v, w, x, y) = (bit(3), bit(2), bit(1), bit(0));

    let small = |h: u16, m: u16, l: u16| (h << 2) | (m << 1) | l;
    let large = |l: u16| 8 | l;

    let (d2, d1, d0) = if v == 0 {
        (small(p, q, r), small(s, t, u), small(w, x, y))
    } else {
        match (w, x, s, t) {
            (0, 0, _, _) => (small(p, q, r), small(s, t, u), large(y)),
            (0, 1, _, _) => (small(p, q, r), large(u), small(s, t, y)),
            (1, 0, _, _) => (large(r), small(s, t, u), small(p, q, y)),
            (1, 1, 0, 0) => (large(r), large(u), small(p, q, y)),
            (1, 1, 0, 1) => (large(r), small(p, q, u), large(y)),
            (1, 1, 1, 0) => (small(p, q, r), large(u), large(y)),
            _ => (large(r), large(u), large(y)),
        }
    };

    d2 * 100 + d1 * 10 + d0
}
