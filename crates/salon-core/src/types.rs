//! # Domain Types
//!
//! Core domain types shared by every salon-core module.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │TransactionRecord │  │   HoursEntry     │  │ TherapistProfile │      │
//! │  │ ───────────────  │  │ ───────────────  │  │ ───────────────  │      │
//! │  │ id (UUID)        │  │ therapist_id     │  │ id               │      │
//! │  │ customer (ref)   │  │ date (day key)   │  │ employment_type  │      │
//! │  │ therapist (ref)  │  │ hours (½ steps)  │  │ hourly_rate      │      │
//! │  │ items, totals    │  └──────────────────┘  └──────────────────┘      │
//! │  └──────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transactions hold *references* to customers and therapists (id + display
//! data frozen at checkout). Profiles stay owned by the staff directory.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Format of an hours-ledger day key.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Upper bound of hours that can be recorded for a single day.
pub const MAX_HOURS_PER_DAY: u32 = 24;

// =============================================================================
// References
// =============================================================================

/// Customer reference frozen onto a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CustomerRef {
            id: id.into(),
            name: name.into(),
            phone: None,
            email: None,
        }
    }
}

/// Therapist reference frozen onto a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TherapistRef {
    pub id: String,
    pub name: String,
    pub role: String,
}

// =============================================================================
// Therapist Profile
// =============================================================================

/// How a therapist is engaged, which decides the payroll branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// On payroll: hourly wage, holiday pay, NIC and a revenue commission.
    Employed,
    /// Rents a chair: fixed share of the revenue they generate.
    SelfEmployed,
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmploymentType::Employed => write!(f, "employed"),
            EmploymentType::SelfEmployed => write!(f, "self_employed"),
        }
    }
}

impl std::str::FromStr for EmploymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "employed" => Ok(EmploymentType::Employed),
            "self_employed" => Ok(EmploymentType::SelfEmployed),
            _ => Err(ValidationError::NotAllowed {
                field: "employment_type".to_string(),
                allowed: vec!["employed".to_string(), "self_employed".to_string()],
            }),
        }
    }
}

/// A therapist as known to the staff directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TherapistProfile {
    pub id: String,
    pub name: String,
    pub role: String,
    pub employment_type: EmploymentType,
    /// Pay per hour worked. Only used on the employed branch.
    pub hourly_rate: Money,
}

impl TherapistProfile {
    /// Placeholder used when commission is calculated for an id the
    /// directory doesn't know and the zero-rate policy is active.
    pub fn zero_rate_placeholder(id: &str) -> Self {
        TherapistProfile {
            id: id.to_string(),
            name: "Unknown".to_string(),
            role: String::new(),
            employment_type: EmploymentType::Employed,
            hourly_rate: Money::zero(),
        }
    }

    /// Reference for freezing onto a transaction.
    pub fn to_ref(&self) -> TherapistRef {
        TherapistRef {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec!["cash".into(), "card".into(), "other".into()],
            }),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A service or product line on a completed transaction.
/// Uses snapshot pattern: name, category and price are frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub name: String,
    pub category: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// Discount applied to this line only (not the transaction discount).
    pub line_discount: Money,
}

impl LineItem {
    /// `unit_price × quantity`, before any discount.
    #[inline]
    pub fn line_amount(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Line amount net of its own line discount.
    #[inline]
    pub fn net_amount(&self) -> Money {
        self.line_amount() - self.line_discount
    }
}

/// A completed checkout. Immutable once created; corrections are new records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRecord {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub customer: CustomerRef,
    pub therapist: TherapistRef,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    /// Transaction-level discount.
    pub discount: Money,
    /// `subtotal - discount`, never negative.
    pub total: Money,
    pub payment_method: PaymentMethod,
}

impl TransactionRecord {
    /// Sum of line net amounts; the base for allocating `discount` to lines.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(LineItem::net_amount).sum()
    }

    /// Checks the stored totals agree with each other.
    ///
    /// ## Rules
    /// - `total >= 0`
    /// - `total == subtotal - discount`
    pub fn validate_totals(&self) -> Result<(), ValidationError> {
        if self.total.is_negative() {
            return Err(ValidationError::out_of_range("total", 0, "subtotal"));
        }
        if self.total != self.subtotal - self.discount {
            return Err(ValidationError::InvalidFormat {
                field: "total".to_string(),
                reason: format!(
                    "{} does not equal subtotal {} minus discount {}",
                    self.total, self.subtotal, self.discount
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Hours
// =============================================================================

/// A quantity of hours worked, counted in half hours.
///
/// Storing half-hour units makes the 30-minute increment rule a property of
/// the type: anything that made it through [`Hours::from_f64`] is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Hours(u32);

impl Hours {
    #[inline]
    pub const fn zero() -> Self {
        Hours(0)
    }

    #[inline]
    pub const fn from_half_hours(half_hours: u32) -> Self {
        Hours(half_hours)
    }

    #[inline]
    pub const fn half_hours(&self) -> u32 {
        self.0
    }

    /// Validates a single day's worth of hours.
    ///
    /// ## Rules
    /// - Must be finite (no NaN, no infinity)
    /// - Must be between 0 and 24 inclusive
    /// - Must be a multiple of 0.5
    ///
    /// ## Example
    /// ```rust
    /// use salon_core::types::Hours;
    ///
    /// assert_eq!(Hours::from_f64(7.5).unwrap().half_hours(), 15);
    /// assert!(Hours::from_f64(7.25).is_err());
    /// assert!(Hours::from_f64(24.5).is_err());
    /// assert!(Hours::from_f64(f64::NAN).is_err());
    /// ```
    pub fn from_f64(hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "hours".to_string(),
            });
        }

        if !(0.0..=MAX_HOURS_PER_DAY as f64).contains(&hours) {
            return Err(ValidationError::out_of_range("hours", 0, MAX_HOURS_PER_DAY));
        }

        let doubled = hours * 2.0;
        if doubled.fract() != 0.0 {
            return Err(ValidationError::NotHalfHourIncrement {
                field: "hours".to_string(),
                value: hours,
            });
        }

        Ok(Hours(doubled as u32))
    }

    /// Checks the value fits in a single day, for anything built with
    /// [`Hours::from_half_hours`] rather than [`Hours::from_f64`].
    ///
    /// Period totals are sums of several days and may exceed this bound;
    /// only per-day entries are held to it.
    pub fn validate_day(self) -> Result<Self, ValidationError> {
        if self.0 > MAX_HOURS_PER_DAY * 2 {
            return Err(ValidationError::out_of_range("hours", 0, MAX_HOURS_PER_DAY));
        }
        Ok(self)
    }

    /// Hours as a float, for display.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    /// Hours as an exact decimal, for payroll arithmetic.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::TWO
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}h", self.0 / 2)
        } else {
            write!(f, "{}.5h", self.0 / 2)
        }
    }
}

impl Add for Hours {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Hours(self.0 + other.0)
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Hours>>(iter: I) -> Self {
        iter.fold(Hours::zero(), Add::add)
    }
}

/// Hours worked by one therapist on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HoursEntry {
    pub therapist_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub hours: Hours,
}

impl HoursEntry {
    /// The `YYYY-MM-DD` key this entry is stored under.
    pub fn day_key(&self) -> String {
        self.date.format(DAY_KEY_FORMAT).to_string()
    }
}

/// Parses a `YYYY-MM-DD` day key.
pub fn parse_day_key(key: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("'{key}' is not a YYYY-MM-DD date"),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
