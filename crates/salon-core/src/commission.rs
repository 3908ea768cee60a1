//! # Commission Engine
//!
//! Turns a therapist's revenue and hours over a period into a payroll
//! breakdown.
//!
//! ## Payroll Branches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EMPLOYED                                                               │
//! │    wage            = hours × hourly_rate                                │
//! │    holiday_pay     = wage × 12%                                         │
//! │    employer_nic    = wage × 13.8%                                       │
//! │    costs           = wage + holiday_pay + employer_nic                  │
//! │    commission      = max(0, (revenue - costs) × 10%)                    │
//! │    therapist_share = wage + holiday_pay + commission                    │
//! │    salon_share     = revenue - therapist_share                          │
//! │                                                                         │
//! │  SELF-EMPLOYED                                                          │
//! │    therapist_share = revenue × 40%                                      │
//! │    salon_share     = revenue - therapist_share          (= 60%)         │
//! │    wage, holiday_pay, employer_nic, commission = 0                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `employer_nic` is a reporting line. It reduces the commission base but is
//! not part of `therapist_share + salon_share == revenue`; the salon pays it
//! out of its share.
//!
//! All arithmetic is exact `Decimal`; each output field is rounded to the
//! penny once. `salon_share` is derived from the rounded `therapist_share`,
//! so the split always adds back to `revenue` exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::aggregation::revenue_total;
use crate::config::{CommissionRates, SalonConfig, UnknownTherapistPolicy};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::hours::sum_hours;
use crate::money::Money;
use crate::range::DateRange;
use crate::store::{HoursFilter, HoursStore, StaffDirectory, TransactionFilter, TransactionStore};
use crate::types::{EmploymentType, Hours, TherapistProfile};

/// Payroll breakdown for one therapist over one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionResult {
    pub therapist_id: String,
    pub therapist_name: String,
    pub employment_type: EmploymentType,
    pub revenue: Money,
    pub hours: Hours,
    pub wage: Money,
    pub holiday_pay: Money,
    pub employer_nic: Money,
    pub commission: Money,
    pub therapist_share: Money,
    pub salon_share: Money,
}

/// Applies the payroll rules to already-aggregated inputs.
///
/// ## Errors
/// `ValidationError::OutOfRange` for a negative hourly rate. Zero is
/// accepted so the zero-rate placeholder can flow through.
///
/// ## Example
/// ```rust
/// use salon_core::commission::compute_commission;
/// use salon_core::config::CommissionRates;
/// use salon_core::money::Money;
/// use salon_core::types::{EmploymentType, Hours, TherapistProfile};
///
/// let profile = TherapistProfile {
///     id: "t1".into(),
///     name: "Bea".into(),
///     role: "stylist".into(),
///     employment_type: EmploymentType::Employed,
///     hourly_rate: Money::from_major(10),
/// };
///
/// let result = compute_commission(
///     &profile,
///     Money::from_major(500),
///     Hours::from_f64(20.0).unwrap(),
///     &CommissionRates::default(),
/// )
/// .unwrap();
///
/// assert_eq!(result.commission.cents(), 2484);
/// assert_eq!(result.therapist_share.cents(), 24884);
/// assert_eq!(result.salon_share.cents(), 25116);
/// ```
pub fn compute_commission(
    profile: &TherapistProfile,
    revenue: Money,
    hours: Hours,
    rates: &CommissionRates,
) -> Result<CommissionResult, ValidationError> {
    if profile.hourly_rate.is_negative() {
        return Err(ValidationError::out_of_range("hourly rate", 0, i64::MAX));
    }

    let revenue_d = revenue.to_decimal();

    let result = match profile.employment_type {
        EmploymentType::Employed => {
            let wage = hours.to_decimal() * profile.hourly_rate.to_decimal();
            let holiday_pay = wage * rates.holiday_pay();
            let employer_nic = wage * rates.employer_nic();
            let costs = wage + holiday_pay + employer_nic;
            let commission = ((revenue_d - costs) * rates.commission()).max(Decimal::ZERO);
            // employer_nic deliberately left out of the therapist's share
            let therapist_share = Money::from_decimal(wage + holiday_pay + commission);

            CommissionResult {
                therapist_id: profile.id.clone(),
                therapist_name: profile.name.clone(),
                employment_type: profile.employment_type,
                revenue,
                hours,
                wage: Money::from_decimal(wage),
                holiday_pay: Money::from_decimal(holiday_pay),
                employer_nic: Money::from_decimal(employer_nic),
                commission: Money::from_decimal(commission),
                therapist_share,
                salon_share: revenue - therapist_share,
            }
        }
        EmploymentType::SelfEmployed => {
            let therapist_share = Money::from_decimal(revenue_d * rates.self_employed_share());

            CommissionResult {
                therapist_id: profile.id.clone(),
                therapist_name: profile.name.clone(),
                employment_type: profile.employment_type,
                revenue,
                hours,
                wage: Money::zero(),
                holiday_pay: Money::zero(),
                employer_nic: Money::zero(),
                commission: Money::zero(),
                therapist_share,
                salon_share: revenue - therapist_share,
            }
        }
    };

    Ok(result)
}

/// Decides which profile to compute against when the directory lookup for
/// `therapist_id` came back as `found`.
pub fn resolve_profile(
    found: Option<TherapistProfile>,
    therapist_id: &str,
    policy: UnknownTherapistPolicy,
) -> CoreResult<TherapistProfile> {
    match (found, policy) {
        (Some(profile), _) => Ok(profile),
        (None, UnknownTherapistPolicy::Reject) => {
            Err(CoreError::not_found("Therapist", therapist_id))
        }
        (None, UnknownTherapistPolicy::ZeroRate) => {
            warn!(
                therapist_id = %therapist_id,
                "Therapist missing from staff directory, using zero-rate placeholder"
            );
            Ok(TherapistProfile::zero_rate_placeholder(therapist_id))
        }
    }
}

/// Commission calculation over the store collaborators.
pub struct CommissionEngine<'a> {
    transactions: &'a dyn TransactionStore,
    hours: &'a dyn HoursStore,
    staff: &'a dyn StaffDirectory,
    config: &'a SalonConfig,
}

impl<'a> CommissionEngine<'a> {
    pub fn new(
        transactions: &'a dyn TransactionStore,
        hours: &'a dyn HoursStore,
        staff: &'a dyn StaffDirectory,
        config: &'a SalonConfig,
    ) -> Self {
        CommissionEngine {
            transactions,
            hours,
            staff,
            config,
        }
    }

    /// Payroll breakdown for `therapist_id` over `range`.
    ///
    /// ## Steps
    /// 1. Revenue: sum of `total` of the therapist's transactions in range.
    ///    `total` is already net of the transaction discount.
    /// 2. Hours: ledger entries for every day touched by the range.
    /// 3. [`compute_commission`] on the therapist's employment branch.
    ///
    /// ## Errors
    /// - `CoreError::NotFound` for an unknown therapist under
    ///   `UnknownTherapistPolicy::Reject`
    pub fn calculate_commission(
        &self,
        therapist_id: &str,
        range: &DateRange,
    ) -> CoreResult<CommissionResult> {
        let profile = resolve_profile(
            self.staff.get_therapist(therapist_id),
            therapist_id,
            self.config.unknown_therapist,
        )?;

        let transactions = self
            .transactions
            .list_transactions(&TransactionFilter::for_therapist(therapist_id, *range));
        let revenue = revenue_total(&transactions);

        let hours = sum_hours(&self.hours.get_hours(&HoursFilter::for_therapist(
            therapist_id,
            range.first_day(),
            range.last_day(),
        )));

        debug!(
            therapist_id = %therapist_id,
            transactions = transactions.len(),
            revenue = %revenue,
            hours = %hours,
            "Calculating commission"
        );

        compute_commission(&profile, revenue, hours, &self.config.commission)
            .map_err(Into::into)
    }

    /// Commission for every therapist in the directory, ordered by name.
    pub fn payroll_summary(&self, range: &DateRange) -> CoreResult<Vec<CommissionResult>> {
        let mut results = self
            .staff
            .list_therapists()
            .iter()
            .map(|profile| self.calculate_commission(&profile.id, range))
            .collect::<CoreResult<Vec<_>>>()?;

        results.sort_by(|a, b| {
            a.therapist_name
                .cmp(&b.therapist_name)
                .then_with(|| a.therapist_id.cmp(&b.therapist_id))
        });
        Ok(results)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
