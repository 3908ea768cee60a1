//! # Salon Configuration
//!
//! Business settings that the payroll, discount and reporting rules read.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SALON_CURRENCY_SYMBOL=€                                            │
//! │     SALON_DISCOUNT_PRESETS=5,10,15,20                                  │
//! │     SALON_UNKNOWN_THERAPIST=zero_rate                                  │
//! │                                                                         │
//! │  2. TOML text (salon.toml, read by the caller)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! currency_symbol = "£"
//! unknown_therapist = "reject"   # reject | zero_rate
//! week_start = "monday"          # monday | sunday
//!
//! [commission]
//! holiday_pay_bps = 1200         # 12%
//! employer_nic_bps = 1380        # 13.8%
//! commission_bps = 1000          # 10%
//! self_employed_share_bps = 4000 # 40% to the therapist
//!
//! [discounts]
//! percentage_presets = [5, 10, 20]
//! ```
//!
//! Reading the file itself is the caller's job; this module only parses text.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::DEFAULT_CURRENCY_SYMBOL;
use crate::validation::validate_rate_bps;

// =============================================================================
// Commission Rates
// =============================================================================

/// Payroll percentages, in basis points (1200 = 12%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionRates {
    /// Holiday pay accrued on top of wage.
    pub holiday_pay_bps: u32,
    /// Employer National Insurance on wage. Reported, not part of the split.
    pub employer_nic_bps: u32,
    /// Commission on revenue left after employment costs.
    pub commission_bps: u32,
    /// Share of revenue kept by a self-employed therapist.
    pub self_employed_share_bps: u32,
}

impl Default for CommissionRates {
    fn default() -> Self {
        CommissionRates {
            holiday_pay_bps: 1200,
            employer_nic_bps: 1380,
            commission_bps: 1000,
            self_employed_share_bps: 4000,
        }
    }
}

impl CommissionRates {
    #[inline]
    pub fn holiday_pay(&self) -> Decimal {
        bps_to_decimal(self.holiday_pay_bps)
    }

    #[inline]
    pub fn employer_nic(&self) -> Decimal {
        bps_to_decimal(self.employer_nic_bps)
    }

    #[inline]
    pub fn commission(&self) -> Decimal {
        bps_to_decimal(self.commission_bps)
    }

    #[inline]
    pub fn self_employed_share(&self) -> Decimal {
        bps_to_decimal(self.self_employed_share_bps)
    }

    fn validate(&self) -> CoreResult<()> {
        validate_rate_bps("holiday_pay_bps", self.holiday_pay_bps)?;
        validate_rate_bps("employer_nic_bps", self.employer_nic_bps)?;
        validate_rate_bps("commission_bps", self.commission_bps)?;
        validate_rate_bps("self_employed_share_bps", self.self_employed_share_bps)?;
        Ok(())
    }
}

fn bps_to_decimal(bps: u32) -> Decimal {
    Decimal::new(bps as i64, 4)
}

// =============================================================================
// Discounts
// =============================================================================

/// Which percentage discounts the till offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountConfig {
    /// Whole percentages, each in 1..=100.
    pub percentage_presets: Vec<u32>,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        DiscountConfig {
            percentage_presets: vec![5, 10, 20],
        }
    }
}

impl DiscountConfig {
    /// Whether `pct` is one of the offered presets.
    pub fn is_allowed(&self, pct: u32) -> bool {
        self.percentage_presets.contains(&pct)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.percentage_presets.is_empty() {
            return Err(CoreError::InvalidConfig(
                "discounts.percentage_presets must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .percentage_presets
            .iter()
            .find(|pct| **pct == 0 || **pct > 100)
        {
            return Err(CoreError::InvalidConfig(format!(
                "discount preset {bad}% must be between 1 and 100"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Policies
// =============================================================================

/// What commission calculation does with a therapist id the staff directory
/// doesn't know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTherapistPolicy {
    /// Fail with `CoreError::NotFound`.
    #[default]
    Reject,
    /// Compute against an employed, zero-rate placeholder and log a warning.
    ZeroRate,
}

impl FromStr for UnknownTherapistPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "strict" => Ok(UnknownTherapistPolicy::Reject),
            "zero_rate" | "zero-rate" | "placeholder" => Ok(UnknownTherapistPolicy::ZeroRate),
            other => Err(CoreError::InvalidConfig(format!(
                "Unknown therapist policy: '{other}'. Valid options: reject, zero_rate"
            ))),
        }
    }
}

/// First day of a reporting week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

// =============================================================================
// Salon Config
// =============================================================================

/// Complete business configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalonConfig {
    pub currency_symbol: String,
    pub commission: CommissionRates,
    pub discounts: DiscountConfig,
    pub unknown_therapist: UnknownTherapistPolicy,
    pub week_start: WeekStart,
}

impl Default for SalonConfig {
    fn default() -> Self {
        SalonConfig {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            commission: CommissionRates::default(),
            discounts: DiscountConfig::default(),
            unknown_therapist: UnknownTherapistPolicy::default(),
            week_start: WeekStart::default(),
        }
    }
}

impl SalonConfig {
    /// Parses TOML text; missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: SalonConfig =
            toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `SALON_*` process environment variables.
    pub fn from_env() -> CoreResult<Self> {
        let mut config = SalonConfig::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `SALON_*` overrides from `lookup`.
    ///
    /// ## Variables
    /// - `SALON_CURRENCY_SYMBOL`: display symbol
    /// - `SALON_DISCOUNT_PRESETS`: comma separated percentages, e.g. `5,10,20`
    /// - `SALON_UNKNOWN_THERAPIST`: `reject` or `zero_rate`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("SALON_CURRENCY_SYMBOL") {
            debug!(symbol = %symbol, "Currency symbol overridden from environment");
            self.currency_symbol = symbol;
        }

        if let Some(presets) = lookup("SALON_DISCOUNT_PRESETS") {
            let parsed: Result<Vec<u32>, _> = presets
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<u32>)
                .collect();
            match parsed {
                Ok(values) => self.discounts.percentage_presets = values,
                Err(e) => {
                    warn!(value = %presets, error = %e, "Ignoring unparsable SALON_DISCOUNT_PRESETS");
                }
            }
        }

        if let Some(policy) = lookup("SALON_UNKNOWN_THERAPIST") {
            self.unknown_therapist = policy.parse()?;
        }

        self.validate()
    }

    /// Rejects impossible rates and discount presets.
    pub fn validate(&self) -> CoreResult<()> {
        self.commission.validate()?;
        self.discounts.validate()?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
