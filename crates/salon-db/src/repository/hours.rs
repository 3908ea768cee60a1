//! # Hours Repository
//!
//! Persistent hours ledger: one row per (therapist, day).
//!
//! Upserts are a single `INSERT ... ON CONFLICT DO UPDATE` so two tills
//! recording the same day never produce two rows; the last write wins.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use salon_core::store::HoursFilter;
use salon_core::types::{parse_day_key, DAY_KEY_FORMAT};
use salon_core::validation::validate_id;
use salon_core::{Hours, HoursEntry};

use super::to_millis;
use crate::error::{DbError, DbResult};

/// Row shape of the `hours_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct HoursRow {
    therapist_id: String,
    work_date: String,
    half_hours: i64,
}

impl TryFrom<HoursRow> for HoursEntry {
    type Error = DbError;

    fn try_from(row: HoursRow) -> DbResult<Self> {
        Ok(HoursEntry {
            date: parse_day_key(&row.work_date)
                .map_err(|e| DbError::Serialization(e.to_string()))?,
            hours: half_hours_to_hours(row.half_hours)?,
            therapist_id: row.therapist_id,
        })
    }
}

fn half_hours_to_hours(half_hours: i64) -> DbResult<Hours> {
    u32::try_from(half_hours)
        .map(Hours::from_half_hours)
        .map_err(|_| DbError::Serialization(format!("{half_hours} half hours out of range")))
}

fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Repository for the hours ledger.
#[derive(Debug, Clone)]
pub struct HoursRepository {
    pool: SqlitePool,
}

impl HoursRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HoursRepository { pool }
    }

    /// Records the entry, replacing any earlier value for the same day.
    ///
    /// ## Errors
    /// - `DbError::Core` for a blank therapist id or more than 24 hours
    pub async fn upsert(&self, entry: &HoursEntry) -> DbResult<HoursEntry> {
        validate_id("therapist id", &entry.therapist_id)?;
        entry.hours.validate_day()?;

        debug!(
            therapist_id = %entry.therapist_id,
            date = %entry.day_key(),
            hours = %entry.hours,
            "Upserting hours"
        );

        sqlx::query(
            r#"
            INSERT INTO hours_entries (therapist_id, work_date, half_hours, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (therapist_id, work_date) DO UPDATE SET
                half_hours = excluded.half_hours,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entry.therapist_id)
        .bind(entry.day_key())
        .bind(i64::from(entry.hours.half_hours()))
        .bind(to_millis(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(entry.clone())
    }

    /// Entries matching `filter`, ordered by day, then therapist.
    pub async fn list(&self, filter: &HoursFilter) -> DbResult<Vec<HoursEntry>> {
        let rows = sqlx::query_as::<_, HoursRow>(
            r#"
            SELECT therapist_id, work_date, half_hours
            FROM hours_entries
            WHERE (?1 IS NULL OR therapist_id = ?1)
              AND (?2 IS NULL OR work_date >= ?2)
              AND (?3 IS NULL OR work_date <= ?3)
            ORDER BY work_date, therapist_id
            "#,
        )
        .bind(filter.therapist_id.as_deref())
        .bind(filter.from.map(day_key))
        .bind(filter.to.map(day_key))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HoursEntry::try_from).collect()
    }

    /// Inclusive day-range sum for one therapist.
    pub async fn total_hours(
        &self,
        therapist_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Hours> {
        let half_hours: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(half_hours), 0)
            FROM hours_entries
            WHERE therapist_id = ?1 AND work_date BETWEEN ?2 AND ?3
            "#,
        )
        .bind(therapist_id)
        .bind(day_key(from))
        .bind(day_key(to))
        .fetch_one(&self.pool)
        .await?;

        half_hours_to_hours(half_hours)
    }

    /// Deletes the entry for that day. Returns whether a row was removed.
    pub async fn delete(&self, therapist_id: &str, date: NaiveDate) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM hours_entries WHERE therapist_id = ?1 AND work_date = ?2",
        )
        .bind(therapist_id)
        .bind(day_key(date))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
