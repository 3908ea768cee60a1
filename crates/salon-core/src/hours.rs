//! # Hours Ledger
//!
//! Hours worked per therapist per day, with upsert semantics.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Key: (therapist_id, YYYY-MM-DD)      Value: Hours (½ hour steps)      │
//! │                                                                         │
//! │  upsert("t1", 2026-03-02, 7.5)  →  { t1, 2026-03-02 } = 7.5            │
//! │  upsert("t1", 2026-03-02, 6.0)  →  { t1, 2026-03-02 } = 6.0  REPLACED  │
//! │                                                        (never summed)   │
//! │                                                                         │
//! │  upsert("t1", 2026-03-02, 7.25) →  ValidationError, ledger unchanged   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::store::{HoursFilter, HoursStore, StaffDirectory};
use crate::types::{Hours, HoursEntry};
use crate::validation::validate_id;

/// Display name used when an hours entry points at a therapist the staff
/// directory doesn't have.
pub const UNKNOWN_THERAPIST_NAME: &str = "Unknown";

/// Summed hours for one therapist over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TherapistHours {
    pub therapist_id: String,
    pub name: String,
    pub hours: Hours,
}

/// In-memory hours ledger.
#[derive(Debug, Clone, Default)]
pub struct HoursLedger {
    entries: BTreeMap<(String, NaiveDate), Hours>,
}

impl HoursLedger {
    pub fn new() -> Self {
        HoursLedger::default()
    }

    /// Records `hours` for `therapist_id` on `date`, replacing any earlier
    /// entry for that day.
    ///
    /// ## Errors
    /// - `ValidationError::Required` for an empty therapist id
    /// - `ValidationError` from [`Hours::from_f64`] (NaN, outside 0..=24,
    ///   not a multiple of 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use salon_core::hours::HoursLedger;
    ///
    /// let mut ledger = HoursLedger::new();
    /// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    ///
    /// ledger.upsert_hours("t1", day, 7.5).unwrap();
    /// ledger.upsert_hours("t1", day, 6.0).unwrap();
    ///
    /// assert_eq!(ledger.total_hours("t1", day, day).as_f64(), 6.0);
    /// ```
    pub fn upsert_hours(
        &mut self,
        therapist_id: &str,
        date: NaiveDate,
        hours: f64,
    ) -> CoreResult<HoursEntry> {
        validate_id("therapist id", therapist_id)?;
        let hours = Hours::from_f64(hours)?;

        let entry = HoursEntry {
            therapist_id: therapist_id.trim().to_string(),
            date,
            hours,
        };
        HoursStore::upsert_hours(self, entry)
    }

    /// Inclusive day-range sum for one therapist.
    pub fn total_hours(&self, therapist_id: &str, start: NaiveDate, end: NaiveDate) -> Hours {
        sum_hours(&self.get_hours(&HoursFilter::for_therapist(therapist_id, start, end)))
    }

    /// Per-therapist totals for every therapist with an entry in range.
    pub fn hours_by_therapist_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        directory: &dyn StaffDirectory,
    ) -> Vec<TherapistHours> {
        hours_by_therapist(&self.get_hours(&HoursFilter::between(start, end)), directory)
    }

    /// Deletes the entry for that day, returning it if there was one.
    pub fn remove_hours(&mut self, therapist_id: &str, date: NaiveDate) -> Option<HoursEntry> {
        self.entries
            .remove(&(therapist_id.to_string(), date))
            .map(|hours| HoursEntry {
                therapist_id: therapist_id.to_string(),
                date,
                hours,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HoursStore for HoursLedger {
    /// Matching entries ordered by day, then therapist.
    fn get_hours(&self, filter: &HoursFilter) -> Vec<HoursEntry> {
        let mut found: Vec<HoursEntry> = self
            .entries
            .iter()
            .map(|((therapist_id, date), hours)| HoursEntry {
                therapist_id: therapist_id.clone(),
                date: *date,
                hours: *hours,
            })
            .filter(|entry| filter.matches(entry))
            .collect();
        found.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.therapist_id.cmp(&b.therapist_id))
        });
        found
    }

    fn upsert_hours(&mut self, entry: HoursEntry) -> CoreResult<HoursEntry> {
        entry.hours.validate_day()?;

        let previous = self
            .entries
            .insert((entry.therapist_id.clone(), entry.date), entry.hours);

        debug!(
            therapist_id = %entry.therapist_id,
            date = %entry.day_key(),
            hours = %entry.hours,
            replaced = ?previous.map(|h| h.to_string()),
            "Upserted hours"
        );

        Ok(entry)
    }
}

/// Sums the hours of `entries`.
pub fn sum_hours<'a>(entries: impl IntoIterator<Item = &'a HoursEntry>) -> Hours {
    entries.into_iter().map(|entry| entry.hours).sum()
}

/// Groups entries per therapist and joins display names from `directory`.
///
/// Entries whose therapist is missing from the directory are still reported,
/// under [`UNKNOWN_THERAPIST_NAME`], and logged: they point at a broken
/// reference in the stored data.
///
/// Result is ordered by name, then therapist id.
pub fn hours_by_therapist<'a>(
    entries: impl IntoIterator<Item = &'a HoursEntry>,
    directory: &dyn StaffDirectory,
) -> Vec<TherapistHours> {
    let mut totals: HashMap<&str, Hours> = HashMap::new();
    for entry in entries {
        let total = totals.entry(entry.therapist_id.as_str()).or_default();
        *total = *total + entry.hours;
    }

    let mut rows: Vec<TherapistHours> = totals
        .into_iter()
        .map(|(therapist_id, hours)| {
            let name = match directory.get_therapist(therapist_id) {
                Some(profile) => profile.name,
                None => {
                    warn!(
                        therapist_id = %therapist_id,
                        "Hours recorded for therapist missing from staff directory"
                    );
                    UNKNOWN_THERAPIST_NAME.to_string()
                }
            };
            TherapistHours {
                therapist_id: therapist_id.to_string(),
                name,
                hours,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.therapist_id.cmp(&b.therapist_id))
    });
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::money::Money;
    use crate::store::StaffRoster;
    use crate::types::{EmploymentType, TherapistProfile};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn roster() -> StaffRoster {
        let mut roster = StaffRoster::new();
        roster
            .insert(TherapistProfile {
                id: "t1".to_string(),
                name: "Bea".to_string(),
                role: "stylist".to_string(),
                employment_type: EmploymentType::Employed,
                hourly_rate: Money::from_cents(1000),
            })
            .unwrap();
        roster
    }

    #[test]
    fn test_upsert_replaces_not_sums() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(2), 7.5).unwrap();
        ledger.upsert_hours("t1", day(2), 4.0).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_hours("t1", day(1), day(31)).as_f64(), 4.0);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut ledger = HoursLedger::new();
        let first = ledger.upsert_hours("t1", day(2), 8.0).unwrap();
        let total_first = ledger.total_hours("t1", day(2), day(2));
        let second = ledger.upsert_hours("t1", day(2), 8.0).unwrap();

        assert_eq!(first, second);
        assert_eq!(total_first, ledger.total_hours("t1", day(2), day(2)));
    }

    #[test]
    fn test_invalid_hours_leave_ledger_unchanged() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(2), 6.0).unwrap();

        for bad in [-1.0, 24.5, 2.25, f64::NAN] {
            let err = ledger.upsert_hours("t1", day(2), bad).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert!(matches!(
            ledger.upsert_hours(" ", day(2), 1.0),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        assert_eq!(ledger.total_hours("t1", day(2), day(2)).as_f64(), 6.0);
    }

    #[test]
    fn test_store_upsert_rejects_more_than_a_day() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(2), 6.0).unwrap();

        let oversized = HoursEntry {
            therapist_id: "t1".to_string(),
            date: day(2),
            hours: Hours::from_half_hours(100),
        };
        assert!(matches!(
            HoursStore::upsert_hours(&mut ledger, oversized),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let full_day = HoursEntry {
            therapist_id: "t1".to_string(),
            date: day(3),
            hours: Hours::from_half_hours(48),
        };
        assert!(HoursStore::upsert_hours(&mut ledger, full_day).is_ok());

        assert_eq!(ledger.total_hours("t1", day(2), day(2)).as_f64(), 6.0);
        assert_eq!(ledger.total_hours("t1", day(2), day(3)).as_f64(), 30.0);
    }

    #[test]
    fn test_total_hours_range_is_inclusive() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(1), 8.0).unwrap();
        ledger.upsert_hours("t1", day(2), 7.5).unwrap();
        ledger.upsert_hours("t1", day(3), 6.0).unwrap();
        ledger.upsert_hours("t2", day(2), 5.0).unwrap();

        assert_eq!(ledger.total_hours("t1", day(1), day(2)).as_f64(), 15.5);
        assert_eq!(ledger.total_hours("t1", day(3), day(3)).as_f64(), 6.0);
        assert_eq!(ledger.total_hours("t1", day(4), day(9)), Hours::zero());
    }

    #[test]
    fn test_hours_by_therapist_with_unknown() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(1), 8.0).unwrap();
        ledger.upsert_hours("t1", day(2), 2.5).unwrap();
        ledger.upsert_hours("ghost", day(2), 3.0).unwrap();
        ledger.upsert_hours("t1", day(20), 8.0).unwrap();

        let rows = ledger.hours_by_therapist_in_range(day(1), day(7), &roster());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bea");
        assert_eq!(rows[0].hours.as_f64(), 10.5);
        assert_eq!(rows[1].therapist_id, "ghost");
        assert_eq!(rows[1].name, UNKNOWN_THERAPIST_NAME);
    }

    #[test]
    fn test_remove_hours() {
        let mut ledger = HoursLedger::new();
        ledger.upsert_hours("t1", day(1), 8.0).unwrap();

        assert!(ledger.remove_hours("t1", day(2)).is_none());
        let removed = ledger.remove_hours("t1", day(1)).unwrap();
        assert_eq!(removed.hours.as_f64(), 8.0);
        assert!(ledger.is_empty());
    }
}
