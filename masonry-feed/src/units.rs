//! # Layout units
//!
//! This module provides the [`Dp`] type, the single length unit used by the
//! masonry engine for widths, heights, offsets and scroll positions.
//!
//! ## Overview
//!
//! `Dp` is a density-independent length. The engine never converts it to
//! physical pixels; that is the presentation layer's job. All layout math
//! (column widths, centering offsets, rendered heights, scroll windows) is
//! carried out in `Dp`, so one scale factor applied at the edge keeps the whole
//! grid consistent.
//!
//! ## Usage
//!
//! ```
//! use masonry_feed::Dp;
//!
//! let column = Dp(200.0);
//! let gap = Dp(16.0);
//! let stride = column + gap;
//! assert_eq!(stride, Dp(216.0));
//! assert_eq!(stride * 2.0, Dp(432.0));
//! ```

use std::{
    fmt,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

/// A density-independent length in layout space.
///
/// The origin is the top-left corner of the content area, `x` grows to the
/// right and `y` grows downward. Values may be negative: a grid that is wider
/// than its container gets a negative centering offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Dp(pub f64);

impl Dp {
    /// Zero length.
    pub const ZERO: Self = Self(0.0);

    /// Creates a new `Dp` value.
    ///
    /// ```
    /// use masonry_feed::Dp;
    ///
    /// const COLUMN_WIDTH: Dp = Dp::new(200.0);
    /// assert_eq!(COLUMN_WIDTH.raw(), 200.0);
    /// ```
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw `f64` value.
    pub const fn raw(self) -> f64 {
        self.0
    }

    /// Returns the larger of two values.
    ///
    /// `NaN` loses against any number, matching [`f64::max`].
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// Returns the smaller of two values.
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Returns `true` if the value is neither infinite nor `NaN`.
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Bit pattern of the underlying float, usable as an exact memo key.
    pub(crate) fn to_bits(self) -> u64 {
        self.0.to_bits()
    }
}

impl From<f64> for Dp {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<f32> for Dp {
    fn from(value: f32) -> Self {
        Self(f64::from(value))
    }
}

impl From<u32> for Dp {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl fmt::Display for Dp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}dp", self.0)
    }
}

impl Add for Dp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Dp {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Dp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Dp {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Dp {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Dp {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Neg for Dp {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp_arithmetic() {
        let a = Dp(10.0);
        let b = Dp(4.0);

        assert_eq!(a + b, Dp(14.0));
        assert_eq!(a - b, Dp(6.0));
        assert_eq!(a * 3.0, Dp(30.0));
        assert_eq!(a / 4.0, Dp(2.5));
        assert_eq!(-a, Dp(-10.0));
    }

    #[test]
    fn test_dp_assign_ops() {
        let mut value = Dp(1.0);
        value += Dp(2.0);
        assert_eq!(value, Dp(3.0));
        value -= Dp(5.0);
        assert_eq!(value, Dp(-2.0));
    }

    #[test]
    fn test_dp_min_max() {
        assert_eq!(Dp(3.0).max(Dp(7.0)), Dp(7.0));
        assert_eq!(Dp(3.0).min(Dp(7.0)), Dp(3.0));
        assert_eq!(Dp(f64::NAN).max(Dp(1.0)), Dp(1.0));
    }

    #[test]
    fn test_dp_conversions() {
        assert_eq!(Dp::from(12u32), Dp(12.0));
        assert_eq!(Dp::from(1.5f32), Dp(1.5));
        assert_eq!(Dp::new(2.0).raw(), 2.0);
        assert!(!Dp(f64::INFINITY).is_finite());
        assert_eq!(Dp(16.0).to_string(), "16dp");
    }
}
