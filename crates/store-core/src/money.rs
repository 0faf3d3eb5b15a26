//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing bill totals as floats drifts by fractions of a paisa, and     │
//! │  "20.00 == 19.999999" comparisons start failing.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is stored, compared and summed as i64 cents.           │
//! │    Decimal text only exists at the JSON boundary.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The dashboard sends amounts as JSON numbers (`20.00`) or, for values it
//! read back from the database, as decimal strings (`"20.00"`). Both are
//! accepted. Amounts are always written back as JSON numbers.
//!
//! JSON numbers are converted through their shortest decimal representation,
//! never by multiplying a float, so `9.99` is exactly 999 cents and
//! `0.30000000000000004` is rejected instead of silently rounded.
//!
//! ## Usage
//! ```rust
//! use store_core::money::Money;
//!
//! let rate: Money = "10.50".parse().unwrap();
//! assert_eq!(rate.cents(), 1050);
//! assert_eq!(rate.to_string(), "10.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_AMOUNT_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents/paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic on differences stays representable
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Custom serde**: decimal on the wire, cents everywhere else
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use store_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ```rust
    /// use store_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit rate by a (possibly fractional) quantity.
    ///
    /// The result is rounded to the nearest cent, halves away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use store_core::money::Money;
    ///
    /// let rate = Money::from_cents(4000); // 40.00 per kg
    /// assert_eq!(rate.multiply_quantity(0.25).cents(), 1000);
    /// assert_eq!(Money::from_cents(299).multiply_quantity(3.0).cents(), 897);
    /// ```
    pub fn multiply_quantity(&self, qty: f64) -> Money {
        Money((self.0 as f64 * qty).round() as i64)
    }

    /// Divides an amount into `parts` equal shares, rounded to the nearest cent.
    ///
    /// Returns zero when `parts` is zero or negative.
    pub fn divide(&self, parts: i64) -> Money {
        if parts <= 0 {
            return Money::zero();
        }
        let doubled = self.0 as i128 * 2 / parts as i128;
        let rounded = if doubled >= 0 {
            (doubled + 1) / 2
        } else {
            (doubled - 1) / 2
        };
        Money(rounded as i64)
    }

    /// Checks whether two amounts differ by at most `tolerance_cents`.
    ///
    /// The difference is taken in i128, so any two amounts compare.
    #[inline]
    pub fn is_within(&self, other: Money, tolerance_cents: i64) -> bool {
        (self.0 as i128 - other.0 as i128).abs() <= tolerance_cents as i128
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the amount as a decimal number (for JSON output only).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a JSON number through its shortest decimal representation.
    fn from_json_number(value: f64) -> Result<Money, ValidationError> {
        if !value.is_finite() {
            return Err(invalid_amount("must be a finite number"));
        }
        format!("{value}").parse()
    }
}

fn invalid_amount(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses decimal text such as `"20"`, `"20.5"`, `"20.50"` or `"-3.10"`.
///
/// At most two fractional digits are accepted, and the magnitude is
/// capped at MAX_AMOUNT_CENTS.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_text, minor_text) = match digits.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (digits, None),
        };

        if major_text.is_empty() || !major_text.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid_amount("expected a decimal number such as 12.50"));
        }

        let minor = match minor_text {
            None => 0,
            Some(m) if m.is_empty() || !m.chars().all(|c| c.is_ascii_digit()) => {
                return Err(invalid_amount("expected a decimal number such as 12.50"));
            }
            Some(m) if m.len() > 2 => {
                return Err(invalid_amount("at most two decimal places are allowed"));
            }
            Some(m) if m.len() == 1 => m.parse::<i64>().unwrap_or(0) * 10,
            Some(m) => m.parse::<i64>().unwrap_or(0),
        };

        let cents = major_text
            .parse::<i64>()
            .ok()
            .and_then(|major| major.checked_mul(100))
            .and_then(|c| c.checked_add(minor))
            .filter(|c| *c <= MAX_AMOUNT_CENTS)
            .ok_or_else(|| invalid_amount("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .filter(|cents| cents.abs() <= MAX_AMOUNT_CENTS)
            .map(Money)
            .ok_or_else(|| E::custom("amount is too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount is too large"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_json_number(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with two places: `20.00`, `-5.50`.
///
/// Currency symbols are left to the dashboard.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
