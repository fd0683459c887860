//! # Quantity Module
//!
//! Provides the `Quantity` type for stock levels and movements.
//!
//! ## Why Fixed-Point Quantities?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Stock is counted in steps of 0.01 (2.5 kg, 0.25 l, 12 pcs).            │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    10.0 - 0.1 - 0.2 = 9.700000000000001  ❌ WRONG!                      │
//! │    ...and a later Issue of 9.7 fails with "insufficient stock".         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Hundredths                                       │
//! │    1000 - 10 - 20 = 970  (9.7 exactly)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::quantity::Quantity;
//!
//! let on_hand: Quantity = "10".parse().unwrap();
//! let issued = Quantity::from_hundredths(250); // 2.5
//!
//! assert_eq!((on_hand - issued).to_string(), "7.5");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of hundredths in one whole unit.
pub const SCALE: i64 = 100;

/// Largest stock level or movement, in hundredths (one trillion units).
///
/// Two values at this bound still add without overflowing `i64`, and any
/// level at or below it is stored as an INTEGER by SQLite.
pub const MAX_HUNDREDTHS: i64 = 1_000_000_000_000 * SCALE;

// =============================================================================
// Quantity Type
// =============================================================================

/// A stock amount in hundredths of a unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for deltas (an Issue is `-q`)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as hundredths**: `{"quantity": 250}` means 2.5 units
///
/// Stored stock levels are never negative; that invariant is enforced by
/// the [`Catalog`](crate::catalog::Catalog), not by this type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Largest quantity the stockroom tracks.
    pub const MAX: Quantity = Quantity(MAX_HUNDREDTHS);

    /// Creates a quantity from hundredths of a unit.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::quantity::Quantity;
    ///
    /// let q = Quantity::from_hundredths(250);
    /// assert_eq!(q.to_string(), "2.5");
    /// ```
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * SCALE)
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }

    /// Adds two quantities, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Quantity(v)),
            None => None,
        }
    }

    /// Whether the magnitude is within [`Quantity::MAX`].
    #[inline]
    pub const fn is_within_max(&self) -> bool {
        self.0 <= MAX_HUNDREDTHS && self.0 >= -MAX_HUNDREDTHS
    }

    /// Adds a movement to a stock level, returning `None` when the result
    /// would exceed [`Quantity::MAX`].
    #[inline]
    pub const fn checked_stock_add(self, other: Self) -> Option<Self> {
        match self.checked_add(other) {
            Some(sum) if sum.0 <= MAX_HUNDREDTHS => Some(sum),
            _ => None,
        }
    }

    /// Parses user input such as `"12"`, `"2.5"` or `"0.25"`.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored
    /// - An optional leading `-` is accepted (deltas)
    /// - At most two fractional digits
    /// - Magnitude at most [`Quantity::MAX`]
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::parse("2.5").unwrap().hundredths(), 250);
    /// assert!(Quantity::parse("1.234").is_err());
    /// assert!(Quantity::parse("abc").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must be a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value is too large"))?
        };
        // "5" → 50 hundredths, "05" → 5 hundredths
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("must be a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("must be a number"))?,
        };

        let magnitude = whole_value
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(fraction_value))
            .filter(|v| *v <= MAX_HUNDREDTHS)
            .ok_or_else(|| invalid("value is too large"))?;

        Ok(Quantity(if negative { -magnitude } else { magnitude }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the shortest exact decimal form: `7`, `2.5`, `0.25`, `-3`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / SCALE as u64;
        let fraction = magnitude % SCALE as u64;

        if fraction == 0 {
            write!(f, "{}{}", sign, whole)
        } else if fraction % 10 == 0 {
            write!(f, "{}{}.{}", sign, whole, fraction / 10)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, fraction)
        }
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(Quantity::parse("10").unwrap().hundredths(), 1000);
        assert_eq!(Quantity::parse("2.5").unwrap().hundredths(), 250);
        assert_eq!(Quantity::parse("0.25").unwrap().hundredths(), 25);
        assert_eq!(Quantity::parse("0.05").unwrap().hundredths(), 5);
        assert_eq!(Quantity::parse(".5").unwrap().hundredths(), 50);
        assert_eq!(Quantity::parse("  3 ").unwrap().hundredths(), 300);
        assert_eq!(Quantity::parse("-1.5").unwrap().hundredths(), -150);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Quantity::parse("").is_err());
        assert!(Quantity::parse(".").is_err());
        assert!(Quantity::parse("1.234").is_err());
        assert!(Quantity::parse("1,5").is_err());
        assert!(Quantity::parse("ten").is_err());
        assert!(Quantity::parse("1e3").is_err());
        assert!(Quantity::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_caps_at_max() {
        assert_eq!(Quantity::parse("1000000000000").unwrap(), Quantity::MAX);
        assert!(Quantity::parse("1000000000000.01").is_err());
        assert!(Quantity::parse("-1000000000000.01").is_err());
        assert!(Quantity::parse("92233720368547758").is_err());
    }

    #[test]
    fn test_checked_stock_add() {
        let near_max = Quantity::MAX - Quantity::from_units(1);
        assert_eq!(
            near_max.checked_stock_add(Quantity::from_units(1)),
            Some(Quantity::MAX)
        );
        assert_eq!(near_max.checked_stock_add(Quantity::from_hundredths(101)), None);
        assert_eq!(
            Quantity::from_hundredths(i64::MAX).checked_stock_add(Quantity::from_hundredths(1)),
            None
        );
        assert!(Quantity::MAX.is_within_max());
        assert!(!(Quantity::MAX + Quantity::from_hundredths(1)).is_within_max());
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(Quantity::from_hundredths(700).to_string(), "7");
        assert_eq!(Quantity::from_hundredths(250).to_string(), "2.5");
        assert_eq!(Quantity::from_hundredths(25).to_string(), "0.25");
        assert_eq!(Quantity::from_hundredths(-300).to_string(), "-3");
        assert_eq!(Quantity::zero().to_string(), "0");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let mut q = Quantity::from_units(10);
        q -= Quantity::parse("0.1").unwrap();
        q -= Quantity::parse("0.2").unwrap();
        assert_eq!(q, Quantity::parse("9.7").unwrap());

        let total: Quantity = [100, 250, 25].into_iter().map(Quantity::from_hundredths).sum();
        assert_eq!(total.hundredths(), 375);
        assert_eq!((-total).hundredths(), -375);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Quantity::zero().is_zero());
        assert!(Quantity::from_units(1).is_positive());
        assert!(Quantity::from_units(-1).is_negative());
        assert_eq!(Quantity::from_units(-1).abs(), Quantity::from_units(1));
        assert!(Quantity::from_hundredths(i64::MAX)
            .checked_add(Quantity::from_hundredths(1))
            .is_none());
    }
}
