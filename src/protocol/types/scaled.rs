//! Exact numeric values with an explicit decimal scale.

use std::fmt;

/// A value `value * 10^scale`.
///
/// No canonical form is enforced: `{10, 0}` and `{1, 1}` are distinct pairs
/// denoting the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScaledNumber<T> {
    pub value: T,
    pub scale: i32,
}

impl<T> ScaledNumber<T> {
    pub fn new(value: T, scale: i32) -> Self {
        Self { value, scale }
    }
}

impl<T: fmt::Display> fmt::Display for ScaledNumber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}e{}", self.value, self.scale)
    }
}

pub type ScaledInt16 = ScaledNumber<i16>;
pub type ScaledInt32 = ScaledNumber<i32>;
pub type ScaledInt64 = ScaledNumber<i64>;
pub type ScaledInt128 = ScaledNumber<i128>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ScaledInt32::new(1234, -2).to_string(), "1234e-2");
    }
}
