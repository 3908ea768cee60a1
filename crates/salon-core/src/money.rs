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
//! │  OUR SOLUTION: Integer pence for stored amounts                         │
//! │    Prices, subtotals, discounts, totals: i64 minor units               │
//! │                                                                         │
//! │  Payroll percentages (12%, 13.8%, 10%) produce fractional pence.       │
//! │  Those are carried as `Decimal` and rounded exactly ONCE, at the end.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use salon_core::money::Money;
//!
//! let price = Money::from_cents(4500); // £45.00
//! let doubled = price * 2;             // £90.00
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 5000);
//! assert_eq!(doubled.to_string(), "£90.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of minor units in one major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// Default currency symbol used by `Display`.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "£";

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (pence).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences (revenue - costs) may be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Service price ──► CartItem.unit_price ──► Cart subtotal ──► discount
///                                                    │
///                                                    ▼
///                                   TransactionRecord.total ──► revenue
///                                                    │
///                                                    ▼
///                                   CommissionResult (rounded once)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use salon_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents £10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
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

    /// Floors the value at zero.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates `rate_bps` basis points of this amount, rounded half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use salon_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(4550); // £45.50
    /// // 5% = £2.275 → £2.28
    /// assert_eq!(subtotal.percentage_bps(500).cents(), 228);
    /// ```
    pub fn percentage_bps(&self, rate_bps: u32) -> Money {
        // i128 prevents overflow on large amounts
        let part = (self.0 as i128 * rate_bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Returns the amount in major units as an exact `Decimal` (pence / 100).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Rounds a major-unit `Decimal` to the nearest penny, half away from zero.
    ///
    /// This is the single rounding point for values derived from percentages.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use salon_core::money::Money;
    ///
    /// let nic = Decimal::new(27_6000, 4); // 27.6000
    /// assert_eq!(Money::from_decimal(nic).cents(), 2760);
    ///
    /// let half = Decimal::new(1_005, 3); // 1.005
    /// assert_eq!(Money::from_decimal(half).cents(), 101);
    /// ```
    pub fn from_decimal(value: Decimal) -> Money {
        let pence = (value * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let cents = pence.to_i64().unwrap_or(if pence.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        });
        Money(cents)
    }

    /// Parses an operator-entered amount such as `"12.50"` or `"£12.5"`.
    ///
    /// ## Rules
    /// - Must not be empty
    /// - Must be a plain decimal number (no NaN, no exponent)
    /// - At most two decimal places
    ///
    /// Sign is not checked here; discount rules decide what is acceptable.
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix(DEFAULT_CURRENCY_SYMBOL)
            .unwrap_or(trimmed)
            .trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let value = Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{trimmed}' is not a number"),
        })?;

        if value.normalize().scale() > 2 {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "at most two decimal places".to_string(),
            });
        }

        Ok(Money::from_decimal(value))
    }

    /// Formats the amount with the given currency symbol.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the default currency symbol.
///
/// ## Note
/// For debugging and logs. Dashboards format with the configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(DEFAULT_CURRENCY_SYMBOL))
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
