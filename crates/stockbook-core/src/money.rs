//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A ledger that drifts by a cent per transaction is not a ledger.    │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Every price, cost, discount and total is an i64 in the smallest  │
//! │    currency unit. Only the presentation layer formats decimals.     │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 3;                // 32.97
//! assert_eq!(line.cents(), 3297);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the configured currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and loss math
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **No currency field**: The shop runs a single denomination; the
///   display currency is configuration at the presentation boundary,
///   never state carried per value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Checked multiplication by a quantity, `None` on overflow.
    ///
    /// Line totals are `unit price × quantity`; quantities are validated
    /// upstream but overflow still must not wrap silently.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Formats the value with a currency code, e.g. `"USD 10.99"`.
    ///
    /// The currency code comes from server configuration; core never
    /// hardcodes a denomination.
    pub fn format(&self, currency: &str) -> String {
        if self.0 < 0 {
            format!("-{} {}.{:02}", currency, -self.major(), self.minor())
        } else {
            format!("{} {}.{:02}", currency, self.major(), self.minor())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{}.{:02}", -self.major(), self.minor())
        } else {
            write!(f, "{}.{:02}", self.major(), self.minor())
        }
    }
}

// =============================================================================
// Arithmetic Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1099);
        assert_eq!(m.cents(), 1099);
        assert_eq!(m.major(), 10);
        assert_eq!(m.minor(), 99);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 3).cents(), 750);
    }

    #[test]
    fn test_negative_display() {
        let m = Money::from_cents(-550);
        assert_eq!(m.to_string(), "-5.50");
        assert!(m.is_negative());
    }

    #[test]
    fn test_format_with_currency() {
        assert_eq!(Money::from_cents(1099).format("USD"), "USD 10.99");
        assert_eq!(Money::from_cents(-1099).format("EUR"), "-EUR 10.99");
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(
            Money::from_cents(100).checked_mul(5),
            Some(Money::from_cents(500))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }
}
