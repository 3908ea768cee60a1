//! # Repository Module
//!
//! Database repository implementations for the salon back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ReportService / seed                                                  │
//! │       │                                                                 │
//! │       │  db.hours().upsert(&entry)                                     │
//! │       ▼                                                                 │
//! │  HoursRepository                                                       │
//! │  ├── upsert(&self, entry)        ON CONFLICT DO UPDATE                 │
//! │  ├── list(&self, filter)                                               │
//! │  ├── total_hours(&self, id, from, to)                                  │
//! │  └── delete(&self, id, date)                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Rows are mapped into salon-core types at this boundary; nothing       │
//! │  above the repository sees SQL column shapes.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TherapistRepository`](therapist::TherapistRepository) - Staff directory
//! - [`TransactionRepository`](transaction::TransactionRepository) - Completed checkouts
//! - [`HoursRepository`](hours::HoursRepository) - Hours ledger

pub mod hours;
pub mod therapist;
pub mod transaction;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{DbError, DbResult};

/// Stored timestamp (unix millis) for `ts`.
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Inverse of [`to_millis`].
pub(crate) fn from_millis(millis: i64) -> DbResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| DbError::Serialization(format!("timestamp {millis} out of range")))
}
