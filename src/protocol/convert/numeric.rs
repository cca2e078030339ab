//! Numeric conversions between exact integers, binary floats and decimal
//! floats.
//!
//! Exact values travel as `ScaledNumber<T>` (value * 10^scale). Rescaling an
//! integer rounds half away from zero on the magnitude, so the result never
//! depends on how signed division truncates. Binary and decimal floats round
//! to integers half away from zero after adding a small epsilon that absorbs
//! representation noise (12.3f32 is stored as 12.2999999...).

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::types::{
    DecFloat, DecFloat16, DecFloat34, DecimalFormat, ScaledInt128, ScaledInt16, ScaledInt32,
    ScaledInt64, ScaledNumber,
};

/// Signed integer widths that carry SQL exact numerics.
pub trait ExactInteger: Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// Smallest value, widened.
    const LOWER: i128;
    /// Largest value, widened.
    const UPPER: i128;
    /// Type name used in diagnostics.
    const NAME: &'static str;

    fn to_i128(self) -> i128;

    fn from_i128(value: i128) -> Option<Self>;
}

macro_rules! impl_exact_integer {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ExactInteger for $ty {
                const LOWER: i128 = <$ty>::MIN as i128;
                const UPPER: i128 = <$ty>::MAX as i128;
                const NAME: &'static str = $name;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_exact_integer!(i16 => "i16", i32 => "i32", i64 => "i64", i128 => "i128");

/// IEEE 754 binary floating-point widths.
pub trait BinaryFloat: Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// Added to the rounding half-unit when converting to integers.
    const ROUNDING_EPSILON: f64;
    /// Type name used in diagnostics.
    const NAME: &'static str;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    /// Shortest exponential text that reads back as the same value.
    fn to_exponential(self) -> String;
}

impl BinaryFloat for f32 {
    const ROUNDING_EPSILON: f64 = 1e-5;
    const NAME: &'static str = "f32";

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_exponential(self) -> String {
        format!("{:e}", self)
    }
}

impl BinaryFloat for f64 {
    const ROUNDING_EPSILON: f64 = 1e-14;
    const NAME: &'static str = "f64";

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_exponential(self) -> String {
        format!("{:e}", self)
    }
}

// 10^n = UPPER_POWERS[n >> 5] * LOWER_POWERS[n & 0x1F]
const LOWER_POWERS: [f64; 32] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22, 1e23, 1e24, 1e25, 1e26, 1e27, 1e28, 1e29, 1e30, 1e31,
];

const UPPER_POWERS: [f64; 10] = [
    1e0, 1e32, 1e64, 1e96, 1e128, 1e160, 1e192, 1e224, 1e256, 1e288,
];

/// Largest step applied at once by `scale_float`.
const MAX_POWER_STEP: i64 = 300;

/// `10^n` for `n <= 319` from the lookup tables.
pub fn power_of_ten(n: u32) -> f64 {
    match UPPER_POWERS.get((n >> 5) as usize) {
        Some(upper) => upper * LOWER_POWERS[(n & 0x1F) as usize],
        None => f64::INFINITY,
    }
}

/// `value * 10^scale`. Scales beyond the table are applied in steps.
pub fn scale_float(value: f64, scale: i64) -> f64 {
    let mut value = value;
    let mut remaining = scale;

    while remaining > MAX_POWER_STEP {
        value *= power_of_ten(MAX_POWER_STEP as u32);
        remaining -= MAX_POWER_STEP;
    }
    while remaining < -MAX_POWER_STEP {
        value /= power_of_ten(MAX_POWER_STEP as u32);
        remaining += MAX_POWER_STEP;
    }

    if remaining > 0 {
        value * power_of_ten(remaining as u32)
    } else if remaining < 0 {
        value / power_of_ten((-remaining) as u32)
    } else {
        value
    }
}

/// Rescale an exact integer from `from.scale` to `to_scale`.
///
/// Reducing the scale rounds half away from zero on the last discarded
/// digit; increasing it checks the destination range after every
/// multiplication. Fails with `NumericRange` when the result does not fit
/// `To`.
pub fn number_to_number<To: ExactInteger, From: ExactInteger>(
    from: ScaledNumber<From>,
    to_scale: i32,
) -> Result<To> {
    let scale_diff = to_scale as i64 - from.scale as i64;
    let value = rescale(from.value.to_i128(), scale_diff, To::LOWER, To::UPPER)?;
    To::from_i128(value).ok_or(Error::NumericRange)
}

fn rescale(value: i128, scale_diff: i64, lower: i128, upper: i128) -> Result<i128> {
    let result = if scale_diff > 0 {
        let negative = value < 0;
        let mut magnitude = value.unsigned_abs();
        let mut last_digit = 0;

        for _ in 0..scale_diff {
            if magnitude == 0 {
                last_digit = 0;
                break;
            }
            last_digit = magnitude % 10;
            magnitude /= 10;
        }

        if last_digit >= 5 {
            magnitude += 1;
        }

        // At least one division happened, so the magnitude is below 2^127.
        let magnitude = magnitude as i128;
        if negative {
            -magnitude
        } else {
            magnitude
        }
    } else {
        let mut result = value;
        for _ in 0..scale_diff.unsigned_abs() {
            if result == 0 {
                break;
            }
            if result > upper / 10 || result < lower / 10 {
                return Err(Error::NumericRange);
            }
            result *= 10;
            if result > upper || result < lower {
                return Err(Error::NumericRange);
            }
        }
        result
    };

    if result < lower || result > upper {
        return Err(Error::NumericRange);
    }
    Ok(result)
}

/// Round a binary float to an integer at `to_scale`.
///
/// A result within one unit past the destination bounds saturates to the
/// bound; anything further fails with `NumericRange`, as do NaN and
/// infinities.
pub fn float_to_integer<To: ExactInteger, F: BinaryFloat>(from: F, to_scale: i32) -> Result<To> {
    let value = from.to_f64();
    if !value.is_finite() {
        return Err(Error::NumericRange);
    }

    let mut value = scale_float(value, -(to_scale as i64));
    let half = 0.5 + F::ROUNDING_EPSILON;
    if value > 0.0 {
        value += half;
    } else {
        value -= half;
    }

    let lower = To::LOWER as f64;
    let upper = To::UPPER as f64;

    if value < lower {
        if value > lower - 1.0 {
            return To::from_i128(To::LOWER).ok_or(Error::NumericRange);
        }
        return Err(Error::NumericRange);
    }
    if value > upper {
        if value < upper + 1.0 {
            return To::from_i128(To::UPPER).ok_or(Error::NumericRange);
        }
        return Err(Error::NumericRange);
    }

    // `upper` may round above the true bound, so clamp the truncation.
    let truncated = (value as i128).clamp(To::LOWER, To::UPPER);
    To::from_i128(truncated).ok_or(Error::NumericRange)
}

/// Round a decimal float to an integer at `to_scale`.
///
/// Rounds half away from zero with an epsilon of ten units in the last
/// place of the format (1e-14 for 16 digits, 1e-32 for 34 digits).
pub fn decfloat_to_integer<To: ExactInteger, F: DecimalFormat>(
    from: &DecFloat<F>,
    to_scale: i32,
) -> Result<To> {
    if from.is_zero() {
        return To::from_i128(0).ok_or(Error::NumericRange);
    }

    let exponent = from.exponent() as i64 - to_scale as i64;
    let coefficient = from.coefficient();

    let magnitude = if exponent >= 0 {
        if exponent > 38 {
            return Err(Error::NumericRange);
        }
        coefficient
            .checked_mul(10u128.pow(exponent as u32))
            .ok_or(Error::NumericRange)?
    } else {
        let places = exponent.unsigned_abs();
        if places > 38 {
            // The whole value is below 10^-4, far from the rounding threshold.
            0
        } else {
            let places = places as u32;
            let divisor = 10u128.pow(places);
            let integer = coefficient / divisor;
            let remainder = coefficient % divisor;
            let epsilon_places = F::DIGITS - 2;
            let threshold = if places >= epsilon_places {
                divisor / 2 - 10u128.pow(places - epsilon_places)
            } else {
                divisor / 2
            };
            if remainder >= threshold {
                integer + 1
            } else {
                integer
            }
        }
    };

    let value = if from.is_negative() {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    }
    .ok_or(Error::NumericRange)?;

    if value < To::LOWER || value > To::UPPER {
        return Err(Error::NumericRange);
    }
    To::from_i128(value).ok_or(Error::NumericRange)
}

/// Convert an exact value to a binary float. Never fails; values beyond
/// the float's range become infinite.
pub fn integer_to_float<To: BinaryFloat, From: ExactInteger>(from: ScaledNumber<From>) -> To {
    To::from_f64(scale_float(from.value.to_i128() as f64, from.scale as i64))
}

/// Convert a decimal float to a binary float. Never fails.
pub fn decfloat_to_float<To: BinaryFloat, F: DecimalFormat>(from: &DecFloat<F>) -> To {
    let magnitude = scale_float(from.coefficient() as f64, from.exponent() as i64);
    To::from_f64(if from.is_negative() {
        -magnitude
    } else {
        magnitude
    })
}

/// Convert a binary float to a decimal float through its shortest
/// round-trip text.
pub fn float_to_decfloat<F: DecimalFormat, From: BinaryFloat>(from: From) -> Result<DecFloat<F>> {
    if !from.to_f64().is_finite() {
        return Err(Error::NumericRange);
    }
    from.to_exponential().parse()
}

/// Convert an exact value to a decimal float, rounding to its digits.
pub fn integer_to_decfloat<F: DecimalFormat, From: ExactInteger>(
    from: ScaledNumber<From>,
) -> Result<DecFloat<F>> {
    DecFloat::from_scaled(from.value.to_i128(), from.scale)
}

/// Render an exact value as fixed-point text.
///
/// `{1234567, -2}` renders as `12345.67`, `{-5, -3}` as `-0.005` and
/// `{12, 2}` as `1200`.
pub fn number_to_string<T: ExactInteger>(from: ScaledNumber<T>) -> String {
    let value = from.value.to_i128();
    // unsigned_abs also covers the minimum of every width
    let digits = value.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + 4);

    if value < 0 {
        result.push('-');
    }

    if from.scale >= 0 {
        result.push_str(&digits);
        result.extend(std::iter::repeat('0').take(from.scale as usize));
    } else {
        let decimal_places = from.scale.unsigned_abs() as usize;
        if decimal_places >= digits.len() {
            result.push_str("0.");
            result.extend(std::iter::repeat('0').take(decimal_places - digits.len()));
            result.push_str(&digits);
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - decimal_places);
            result.push_str(int_part);
            result.push('.');
            result.push_str(frac_part);
        }
    }

    result
}

/// Render a binary float as its shortest round-trip decimal text.
pub fn float_to_string<F: BinaryFloat>(from: F) -> String {
    from.to_string()
}

/// Parse `true` / `false`, ignoring case and surrounding whitespace.
pub fn string_to_boolean(text: &str) -> Result<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::conversion_from_string(text))
    }
}

/// Parse an exact numeric literal `[+|-] digits [. digits]`.
///
/// The count of fractional digits becomes the negative scale, so `"-12.50"`
/// parses as `{-1250, -2}`. Surrounding whitespace is ignored.
pub fn string_to_scaled(text: &str) -> Result<ScaledInt128> {
    let invalid = || Error::conversion_from_string(text);
    let bytes = text.trim().as_bytes();

    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let mut magnitude: u128 = 0;
    let mut fraction_digits: i64 = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    for &c in digits {
        match c {
            b'0'..=b'9' => {
                seen_digit = true;
                magnitude = magnitude
                    .checked_mul(10)
                    .and_then(|m| m.checked_add((c - b'0') as u128))
                    .ok_or(Error::NumericRange)?;
                if seen_point {
                    fraction_digits += 1;
                }
            }
            b'.' if !seen_point => seen_point = true,
            _ => return Err(invalid()),
        }
    }

    if !seen_digit {
        return Err(invalid());
    }

    let value = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    }
    .ok_or(Error::NumericRange)?;
    let scale = i32::try_from(-fraction_digits).map_err(|_| Error::NumericRange)?;

    Ok(ScaledNumber::new(value, scale))
}

/// Parse an approximate numeric literal (`1.5`, `-2e10`, `inf`).
pub fn string_to_double(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| Error::conversion_from_string(text))
}

/// A numeric value of any width, as read from or written to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int16(ScaledInt16),
    Int32(ScaledInt32),
    Int64(ScaledInt64),
    Int128(ScaledInt128),
    Float(f32),
    Double(f64),
    DecFloat16(DecFloat16),
    DecFloat34(DecFloat34),
}

impl Numeric {
    /// Whether this is an exact (scaled integer) value.
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            Numeric::Int16(_) | Numeric::Int32(_) | Numeric::Int64(_) | Numeric::Int128(_)
        )
    }

    /// Convert to an integer at `to_scale`.
    pub fn to_integer<T: ExactInteger>(&self, to_scale: i32) -> Result<T> {
        match self {
            Numeric::Int16(v) => number_to_number(*v, to_scale),
            Numeric::Int32(v) => number_to_number(*v, to_scale),
            Numeric::Int64(v) => number_to_number(*v, to_scale),
            Numeric::Int128(v) => number_to_number(*v, to_scale),
            Numeric::Float(v) => float_to_integer(*v, to_scale),
            Numeric::Double(v) => float_to_integer(*v, to_scale),
            Numeric::DecFloat16(v) => decfloat_to_integer(v, to_scale),
            Numeric::DecFloat34(v) => decfloat_to_integer(v, to_scale),
        }
    }

    /// Convert to a binary float.
    pub fn to_float<T: BinaryFloat>(&self) -> T {
        match self {
            Numeric::Int16(v) => integer_to_float(*v),
            Numeric::Int32(v) => integer_to_float(*v),
            Numeric::Int64(v) => integer_to_float(*v),
            Numeric::Int128(v) => integer_to_float(*v),
            Numeric::Float(v) => T::from_f64(*v as f64),
            Numeric::Double(v) => T::from_f64(*v),
            Numeric::DecFloat16(v) => decfloat_to_float(v),
            Numeric::DecFloat34(v) => decfloat_to_float(v),
        }
    }

    /// Convert to a decimal float.
    pub fn to_decfloat<F: DecimalFormat>(&self) -> Result<DecFloat<F>> {
        match self {
            Numeric::Int16(v) => integer_to_decfloat(*v),
            Numeric::Int32(v) => integer_to_decfloat(*v),
            Numeric::Int64(v) => integer_to_decfloat(*v),
            Numeric::Int128(v) => integer_to_decfloat(*v),
            Numeric::Float(v) => float_to_decfloat(*v),
            Numeric::Double(v) => float_to_decfloat(*v),
            Numeric::DecFloat16(v) => v.to_format(),
            Numeric::DecFloat34(v) => v.to_format(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int16(v) => f.write_str(&number_to_string(*v)),
            Numeric::Int32(v) => f.write_str(&number_to_string(*v)),
            Numeric::Int64(v) => f.write_str(&number_to_string(*v)),
            Numeric::Int128(v) => f.write_str(&number_to_string(*v)),
            Numeric::Float(v) => f.write_str(&float_to_string(*v)),
            Numeric::Double(v) => f.write_str(&float_to_string(*v)),
            Numeric::DecFloat16(v) => write!(f, "{}", v),
            Numeric::DecFloat34(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scaled<T>(value: T, scale: i32) -> ScaledNumber<T> {
        ScaledNumber::new(value, scale)
    }

    #[test]
    fn test_increase_scale() {
        assert_eq!(number_to_number::<i16, i16>(scaled(123, -1), -2).unwrap(), 1230);
        assert!(matches!(
            number_to_number::<i16, i16>(scaled(123, -1), -4),
            Err(Error::NumericRange)
        ));
        assert_eq!(number_to_number::<i32, i16>(scaled(123, -1), -4).unwrap(), 123000);
    }

    #[test]
    fn test_reduce_scale_int16() {
        assert_eq!(number_to_number::<i16, i16>(scaled(32767, -1), 0).unwrap(), 3277);
        assert_eq!(number_to_number::<i16, i16>(scaled(32767, -4), 0).unwrap(), 3);
        assert_eq!(number_to_number::<i16, i16>(scaled(-32768, -1), 0).unwrap(), -3277);
        assert_eq!(number_to_number::<i16, i16>(scaled(-32768, -4), 0).unwrap(), -3);
        assert_eq!(number_to_number::<i32, i16>(scaled(-32768, -4), 0).unwrap(), -3);
    }

    #[test]
    fn test_reduce_scale_wide() {
        assert_eq!(
            number_to_number::<i32, i32>(scaled(i32::MAX, -1), 0).unwrap(),
            214748365
        );
        assert_eq!(number_to_number::<i32, i32>(scaled(i32::MAX, -4), 0).unwrap(), 214748);
        assert_eq!(
            number_to_number::<i64, i64>(scaled(i64::MAX, -4), 0).unwrap(),
            922337203685478
        );
        assert_eq!(
            number_to_number::<i128, i128>(scaled(i128::MAX, -1), 0).unwrap(),
            17014118346046923173168730371588410573
        );
        assert_eq!(
            number_to_number::<i128, i128>(scaled(i128::MAX, -4), 0).unwrap(),
            17014118346046923173168730371588411
        );
        assert_eq!(
            number_to_number::<i128, i128>(scaled(i128::MIN, -1), 0).unwrap(),
            -17014118346046923173168730371588410573
        );
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        assert_eq!(number_to_number::<i32, i32>(scaled(25, -1), 0).unwrap(), 3);
        assert_eq!(number_to_number::<i32, i32>(scaled(-25, -1), 0).unwrap(), -3);
        assert_eq!(number_to_number::<i32, i32>(scaled(-24, -1), 0).unwrap(), -2);
        // Only the most significant discarded digit counts
        assert_eq!(number_to_number::<i32, i32>(scaled(149, -2), 0).unwrap(), 1);
    }

    #[test]
    fn test_overflow_boundary() {
        assert_eq!(number_to_number::<i16, i32>(scaled(32767, 0), 0).unwrap(), 32767);
        assert!(matches!(
            number_to_number::<i16, i32>(scaled(32768, 0), 0),
            Err(Error::NumericRange)
        ));
        assert!(matches!(
            number_to_number::<i16, i32>(scaled(-32769, 0), 0),
            Err(Error::NumericRange)
        ));
        // Rounding pushes past the bound
        assert!(matches!(
            number_to_number::<i16, i32>(scaled(327675, -1), 0),
            Err(Error::NumericRange)
        ));
    }

    #[test]
    fn test_huge_scale_difference() {
        assert_eq!(number_to_number::<i32, i32>(scaled(5, 0), i32::MAX).unwrap(), 0);
        assert_eq!(number_to_number::<i32, i32>(scaled(0, 0), i32::MIN).unwrap(), 0);
        assert!(matches!(
            number_to_number::<i32, i32>(scaled(1, 0), i32::MIN),
            Err(Error::NumericRange)
        ));
    }

    #[test]
    fn test_float_to_integer() {
        assert_eq!(float_to_integer::<i16, f32>(12.3, -2).unwrap(), 1230);
        assert_eq!(float_to_integer::<i16, f32>(3276.7, 0).unwrap(), 3277);
        assert_eq!(float_to_integer::<i16, f32>(-3.2768, 0).unwrap(), -3);
        assert_eq!(float_to_integer::<i32, f64>(2.5, 0).unwrap(), 3);
        assert_eq!(float_to_integer::<i32, f64>(-2.5, 0).unwrap(), -3);
        assert_eq!(float_to_integer::<i32, f64>(1234.0, 2).unwrap(), 12);
    }

    #[test]
    fn test_float_to_integer_saturates_within_one_unit() {
        assert_eq!(float_to_integer::<i16, f64>(32767.4, 0).unwrap(), i16::MAX);
        assert_eq!(float_to_integer::<i16, f64>(-32768.4, 0).unwrap(), i16::MIN);
        assert!(matches!(
            float_to_integer::<i16, f64>(32768.6, 0),
            Err(Error::NumericRange)
        ));
        assert!(matches!(
            float_to_integer::<i32, f64>(f64::NAN, 0),
            Err(Error::NumericRange)
        ));
        assert!(matches!(
            float_to_integer::<i64, f32>(f32::INFINITY, 0),
            Err(Error::NumericRange)
        ));
    }

    #[test]
    fn test_decfloat_to_integer() {
        let value: DecFloat34 = "2.5".parse().unwrap();
        assert_eq!(decfloat_to_integer::<i32, _>(&value, 0).unwrap(), 3);
        let value: DecFloat34 = "-2.4999".parse().unwrap();
        assert_eq!(decfloat_to_integer::<i32, _>(&value, 0).unwrap(), -2);
        let value: DecFloat16 = "123.456".parse().unwrap();
        assert_eq!(decfloat_to_integer::<i64, _>(&value, -2).unwrap(), 12346);
        let value: DecFloat16 = "1E20".parse().unwrap();
        assert!(matches!(
            decfloat_to_integer::<i64, _>(&value, 0),
            Err(Error::NumericRange)
        ));
        let value: DecFloat34 = "-170141183460469231731687303715884105728".parse().unwrap();
        assert!(decfloat_to_integer::<i128, _>(&value, 0).is_ok());
    }

    #[test]
    fn test_decfloat_epsilon() {
        // 0.49999999999999999 is within 1e-14 of one half for 16 digits
        let value: DecFloat16 = "0.4999999999999999".parse().unwrap();
        assert_eq!(decfloat_to_integer::<i32, _>(&value, 0).unwrap(), 1);
        let value: DecFloat16 = "0.4999999999999".parse().unwrap();
        assert_eq!(decfloat_to_integer::<i32, _>(&value, 0).unwrap(), 0);
    }

    #[test]
    fn test_integer_to_float() {
        assert_eq!(integer_to_float::<f64, i32>(scaled(12345, -2)), 123.45);
        assert_eq!(integer_to_float::<f64, i16>(scaled(-15, 3)), -15000.0);
        assert_eq!(integer_to_float::<f32, i64>(scaled(1, -1)), 0.1f32);
        assert_eq!(integer_to_float::<f64, i32>(scaled(1, 400)), f64::INFINITY);
        assert_eq!(integer_to_float::<f64, i32>(scaled(1, -400)), 0.0);
        assert_eq!(power_of_ten(22), 1e22);
        assert_eq!(power_of_ten(400), f64::INFINITY);
    }

    #[test]
    fn test_decfloat_to_float() {
        let value: DecFloat34 = "-1.25".parse().unwrap();
        assert_eq!(decfloat_to_float::<f64, _>(&value), -1.25);
        let value: DecFloat34 = "1E-310".parse().unwrap();
        assert!(decfloat_to_float::<f64, _>(&value) > 0.0);
    }

    #[test]
    fn test_float_to_decfloat() {
        let value: DecFloat16 = float_to_decfloat(0.1f64).unwrap();
        assert_eq!(value.to_string(), "0.1");
        let value: DecFloat34 = float_to_decfloat(0.1f32).unwrap();
        assert_eq!(value.to_string(), "0.1");
        let value: DecFloat16 = float_to_decfloat(-1234.5f64).unwrap();
        assert_eq!(value.to_string(), "-1234.5");
        assert!(matches!(
            float_to_decfloat::<crate::protocol::types::Decimal64, f64>(f64::NAN),
            Err(Error::NumericRange)
        ));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(scaled(-32768i16, 0)), "-32768");
        assert_eq!(number_to_string(scaled(32767i16, -1)), "3276.7");
        assert_eq!(number_to_string(scaled(-32768i16, -4)), "-3.2768");
        assert_eq!(number_to_string(scaled(1234567i32, -2)), "12345.67");
        assert_eq!(number_to_string(scaled(5i32, -3)), "0.005");
        assert_eq!(number_to_string(scaled(-5i64, -1)), "-0.5");
        assert_eq!(number_to_string(scaled(12i64, 2)), "1200");
        assert_eq!(number_to_string(scaled(0i32, -2)), "0.00");
        assert_eq!(
            number_to_string(scaled(i128::MIN, 0)),
            "-170141183460469231731687303715884105728"
        );
    }

    #[test]
    fn test_string_to_boolean() {
        assert!(string_to_boolean("true").unwrap());
        assert!(string_to_boolean("  TRUE ").unwrap());
        assert!(!string_to_boolean("False").unwrap());
        assert!(matches!(
            string_to_boolean("yes"),
            Err(Error::ConversionErrorFromString { .. })
        ));
    }

    #[test]
    fn test_string_to_scaled() {
        assert_eq!(string_to_scaled("123").unwrap(), scaled(123, 0));
        assert_eq!(string_to_scaled("-12.50").unwrap(), scaled(-1250, -2));
        assert_eq!(string_to_scaled("+.5").unwrap(), scaled(5, -1));
        assert_eq!(string_to_scaled(" 7. ").unwrap(), scaled(7, 0));
        assert_eq!(
            string_to_scaled("-170141183460469231731687303715884105728").unwrap(),
            scaled(i128::MIN, 0)
        );
        for text in ["", "-", ".", "1.2.3", "12a", "1e5", "--1"] {
            assert!(
                matches!(string_to_scaled(text), Err(Error::ConversionErrorFromString { .. })),
                "{text}"
            );
        }
        assert!(matches!(
            string_to_scaled("170141183460469231731687303715884105728"),
            Err(Error::NumericRange)
        ));
    }

    #[test]
    fn test_string_to_double() {
        assert_eq!(string_to_double(" 1.5e3 ").unwrap(), 1500.0);
        assert!(matches!(
            string_to_double("1,5"),
            Err(Error::ConversionErrorFromString { .. })
        ));
    }

    #[test]
    fn test_numeric_dispatch() {
        let value = Numeric::Int32(scaled(12345, -2));
        assert_eq!(value.to_integer::<i16>(0).unwrap(), 123);
        assert_eq!(value.to_float::<f64>(), 123.45);
        let decimal = value.to_decfloat::<crate::protocol::types::Decimal64>();
        assert_eq!(decimal.unwrap().to_string(), "123.45");
        assert_eq!(value.to_string(), "123.45");
        assert!(value.is_exact());
        assert!(!Numeric::Double(1.0).is_exact());
    }

    proptest! {
        #[test]
        fn prop_rounding_symmetry(x in -(i64::MAX)..=i64::MAX, from in -6i32..6, to in -6i32..6) {
            let positive = number_to_number::<i64, i64>(scaled(x, from), to);
            let negative = number_to_number::<i64, i64>(scaled(-x, from), to);
            match (positive, negative) {
                (Ok(p), Ok(n)) => prop_assert_eq!(n, -p),
                (Err(_), Err(_)) => {}
                (p, n) => prop_assert!(false, "asymmetric: {:?} {:?}", p, n),
            }
        }

        #[test]
        fn prop_scale_composition(x in any::<i32>(), s1 in -4i32..4, s2 in -8i32..0) {
            // Moving to a finer scale and back never rounds.
            let s2 = s1 + s2;
            let via = number_to_number::<i128, i32>(scaled(x, s1), s2)
                .and_then(|v| number_to_number::<i128, i128>(scaled(v, s2), s1 - 1));
            let direct = number_to_number::<i128, i32>(scaled(x, s1), s1 - 1);
            prop_assert_eq!(via.unwrap(), direct.unwrap());
        }

        #[test]
        fn prop_scale_refinement(
            x in any::<i16>(),
            s1 in 0i32..4,
            step1 in 1i32..4,
            step2 in 1i32..5,
        ) {
            // Coarse to fine to finer is exact and matches the direct move.
            let s2 = s1 - step1;
            let s3 = s2 - step2;
            let fine = number_to_number::<i64, i16>(scaled(x, s1), s2).unwrap();
            let finer = number_to_number::<i64, i64>(scaled(fine, s2), s3).unwrap();
            let direct = number_to_number::<i64, i16>(scaled(x, s1), s3).unwrap();
            prop_assert_eq!(finer, direct);
            let factor = 10i64.pow((s1 - s3) as u32);
            prop_assert_eq!(finer, x as i64 * factor);
        }

        #[test]
        fn prop_number_to_string_parses_back(x in any::<i64>(), scale in -20i32..0) {
            let text = number_to_string(scaled(x, scale));
            let parsed = string_to_scaled(&text).unwrap();
            prop_assert_eq!(parsed, scaled(x as i128, scale));
        }
    }
}
