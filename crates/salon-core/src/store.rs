//! # Store Interfaces
//!
//! The collaborators the pure core reads from, plus in-memory versions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trait               Reads / writes              In-memory impl         │
//! │  ─────────────────   ─────────────────────────   ────────────────────   │
//! │  TransactionStore    list_transactions(filter)   TransactionLog         │
//! │  HoursStore          get_hours / upsert_hours    HoursLedger (hours.rs) │
//! │  StaffDirectory      get_therapist(id)           StaffRoster            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistent stores must make `upsert_hours` atomic per
//! (therapist, day) and transaction appends atomic; the core does no locking.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreResult;
use crate::range::DateRange;
use crate::types::{HoursEntry, TherapistProfile, TransactionRecord};
use crate::validation::validate_therapist_profile;

// =============================================================================
// Filters
// =============================================================================

/// Selects transactions by therapist, customer and time window.
/// Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub therapist_id: Option<String>,
    pub customer_id: Option<String>,
    pub range: Option<DateRange>,
}

impl TransactionFilter {
    /// Transactions taken by one therapist within `range`.
    pub fn for_therapist(therapist_id: impl Into<String>, range: DateRange) -> Self {
        TransactionFilter {
            therapist_id: Some(therapist_id.into()),
            customer_id: None,
            range: Some(range),
        }
    }

    /// Any transaction within `range`.
    pub fn in_range(range: DateRange) -> Self {
        TransactionFilter {
            range: Some(range),
            ..TransactionFilter::default()
        }
    }

    pub fn matches(&self, txn: &TransactionRecord) -> bool {
        self.therapist_id
            .as_deref()
            .map_or(true, |id| txn.therapist.id == id)
            && self
                .customer_id
                .as_deref()
                .map_or(true, |id| txn.customer.id == id)
            && self.range.map_or(true, |range| range.contains(txn.date))
    }
}

/// Selects hours entries by therapist and inclusive day window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursFilter {
    pub therapist_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HoursFilter {
    pub fn for_therapist(therapist_id: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        HoursFilter {
            therapist_id: Some(therapist_id.into()),
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        HoursFilter {
            therapist_id: None,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn matches(&self, entry: &HoursEntry) -> bool {
        self.therapist_id
            .as_deref()
            .map_or(true, |id| entry.therapist_id == id)
            && self.from.map_or(true, |from| entry.date >= from)
            && self.to.map_or(true, |to| entry.date <= to)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Read access to completed transactions.
pub trait TransactionStore {
    fn list_transactions(&self, filter: &TransactionFilter) -> Vec<TransactionRecord>;
}

/// Read/write access to the hours ledger.
pub trait HoursStore {
    fn get_hours(&self, filter: &HoursFilter) -> Vec<HoursEntry>;

    /// Replaces any entry for the same (therapist, day); returns what is stored.
    ///
    /// Entries over a day's worth of hours are rejected and leave the store
    /// unchanged.
    fn upsert_hours(&mut self, entry: HoursEntry) -> CoreResult<HoursEntry>;
}

/// Lookup of therapist profiles.
pub trait StaffDirectory {
    fn get_therapist(&self, id: &str) -> Option<TherapistProfile>;

    fn list_therapists(&self) -> Vec<TherapistProfile>;
}

// =============================================================================
// In-memory Transaction Log
// =============================================================================

/// Append-only list of transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    records: Vec<TransactionRecord>,
}

impl TransactionLog {
    pub fn new() -> Self {
        TransactionLog::default()
    }

    /// Appends a transaction after checking its totals agree.
    pub fn append(&mut self, record: TransactionRecord) -> CoreResult<()> {
        record.validate_totals()?;
        debug!(id = %record.id, total = %record.total, "Appending transaction");
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

impl TransactionStore for TransactionLog {
    fn list_transactions(&self, filter: &TransactionFilter) -> Vec<TransactionRecord> {
        self.records
            .iter()
            .filter(|txn| filter.matches(txn))
            .cloned()
            .collect()
    }
}

// =============================================================================
// In-memory Staff Roster
// =============================================================================

/// Therapist profiles keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StaffRoster {
    profiles: HashMap<String, TherapistProfile>,
}

impl StaffRoster {
    pub fn new() -> Self {
        StaffRoster::default()
    }

    /// Adds or replaces a profile after validating it.
    pub fn insert(&mut self, profile: TherapistProfile) -> CoreResult<()> {
        validate_therapist_profile(&profile)?;
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<TherapistProfile> {
        self.profiles.remove(id)
    }
}

impl StaffDirectory for StaffRoster {
    fn get_therapist(&self, id: &str) -> Option<TherapistProfile> {
        self.profiles.get(id).cloned()
    }

    fn list_therapists(&self) -> Vec<TherapistProfile> {
        let mut all: Vec<TherapistProfile> = self.profiles.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        all
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CustomerRef, EmploymentType, Hours, PaymentMethod, TherapistRef};
    use chrono::{TimeZone, Utc};

    fn txn(therapist: &str, customer: &str, day: u32, total: i64) -> TransactionRecord {
        TransactionRecord {
            id: format!("{therapist}-{customer}-{day}"),
            date: Utc.with_ymd_and_hms(2026, 4, day, 14, 0, 0).unwrap(),
            customer: CustomerRef::new(customer, customer),
            therapist: TherapistRef {
                id: therapist.to_string(),
                name: therapist.to_string(),
                role: "stylist".to_string(),
            },
            items: vec![],
            subtotal: Money::from_cents(total),
            discount: Money::zero(),
            total: Money::from_cents(total),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_transaction_filter() {
        let mut log = TransactionLog::new();
        log.append(txn("t1", "c1", 1, 1000)).unwrap();
        log.append(txn("t1", "c2", 5, 2000)).unwrap();
        log.append(txn("t2", "c1", 5, 3000)).unwrap();

        let range = DateRange::for_days(
            NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 5).unwrap(),
        )
        .unwrap();

        assert_eq!(log.list_transactions(&TransactionFilter::default()).len(), 3);
        assert_eq!(
            log.list_transactions(&TransactionFilter::for_therapist("t1", range))
                .len(),
            1
        );
        let by_customer = TransactionFilter {
            customer_id: Some("c1".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(log.list_transactions(&by_customer).len(), 2);
    }

    #[test]
    fn test_append_rejects_inconsistent_totals() {
        let mut log = TransactionLog::new();
        let mut bad = txn("t1", "c1", 1, 1000);
        bad.total = Money::from_cents(999);
        assert!(log.append(bad).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_hours_filter() {
        let entry = HoursEntry {
            therapist_id: "t1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
            hours: Hours::from_half_hours(8),
        };
        let day = |d| NaiveDate::from_ymd_opt(2026, 4, d).unwrap();

        assert!(HoursFilter::for_therapist("t1", day(3), day(3)).matches(&entry));
        assert!(!HoursFilter::for_therapist("t2", day(1), day(30)).matches(&entry));
        assert!(!HoursFilter::between(day(4), day(30)).matches(&entry));
        assert!(HoursFilter::default().matches(&entry));
    }

    #[test]
    fn test_roster_validates_and_sorts() {
        let mut roster = StaffRoster::new();
        let profile = |id: &str, name: &str, rate| TherapistProfile {
            id: id.to_string(),
            name: name.to_string(),
            role: "therapist".to_string(),
            employment_type: EmploymentType::Employed,
            hourly_rate: Money::from_cents(rate),
        };

        roster.insert(profile("t2", "Zoe", 1100)).unwrap();
        roster.insert(profile("t1", "Amy", 1200)).unwrap();
        assert!(roster.insert(profile("t3", "Max", 0)).is_err());

        let names: Vec<String> = roster.list_therapists().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Amy", "Zoe"]);
        assert!(roster.get_therapist("t3").is_none());
    }
}
