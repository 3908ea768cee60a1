//! # Therapist Repository
//!
//! The persistent staff directory.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use salon_core::validation::validate_therapist_profile;
use salon_core::{EmploymentType, Money, TherapistProfile};

use super::to_millis;
use crate::error::{DbError, DbResult};

/// Row shape of the `therapists` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct TherapistRow {
    id: String,
    name: String,
    role: String,
    employment_type: String,
    hourly_rate_cents: i64,
}

impl TryFrom<TherapistRow> for TherapistProfile {
    type Error = DbError;

    fn try_from(row: TherapistRow) -> DbResult<Self> {
        let employment_type: EmploymentType = row
            .employment_type
            .parse()
            .map_err(|_| DbError::Serialization(format!(
                "therapist {} has employment type '{}'",
                row.id, row.employment_type
            )))?;

        Ok(TherapistProfile {
            id: row.id,
            name: row.name,
            role: row.role,
            employment_type,
            hourly_rate: Money::from_cents(row.hourly_rate_cents),
        })
    }
}

/// Repository for therapist profiles.
#[derive(Debug, Clone)]
pub struct TherapistRepository {
    pool: SqlitePool,
}

impl TherapistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TherapistRepository { pool }
    }

    /// Inserts or replaces a profile after validating it.
    pub async fn upsert(&self, profile: &TherapistProfile) -> DbResult<()> {
        validate_therapist_profile(profile)?;
        let now = to_millis(Utc::now());

        debug!(id = %profile.id, name = %profile.name, "Upserting therapist");

        sqlx::query(
            r#"
            INSERT INTO therapists (
                id, name, role, employment_type, hourly_rate_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                role = excluded.role,
                employment_type = excluded.employment_type,
                hourly_rate_cents = excluded.hourly_rate_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.role)
        .bind(profile.employment_type.to_string())
        .bind(profile.hourly_rate.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TherapistProfile>> {
        let row = sqlx::query_as::<_, TherapistRow>(
            r#"
            SELECT id, name, role, employment_type, hourly_rate_cents
            FROM therapists
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TherapistProfile::try_from).transpose()
    }

    /// All therapists ordered by name, then id.
    pub async fn list(&self) -> DbResult<Vec<TherapistProfile>> {
        let rows = sqlx::query_as::<_, TherapistRow>(
            r#"
            SELECT id, name, role, employment_type, hourly_rate_cents
            FROM therapists
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TherapistProfile::try_from).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
