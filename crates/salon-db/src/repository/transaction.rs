//! # Transaction Repository
//!
//! Completed checkouts. Rows are written once and never updated; a
//! correction is a new transaction.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TransactionRecord             transactions row                         │
//! │  ─────────────────             ────────────────                         │
//! │  date                    ──►   occurred_at (unix millis)                │
//! │  customer {id,name,..}   ──►   customer_* columns (frozen copy)         │
//! │  therapist {id,name,role}──►   therapist_* columns (frozen copy)        │
//! │  items: Vec<LineItem>    ──►   items_json                               │
//! │  subtotal/discount/total ──►   *_cents, CHECK total = sub - discount    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are kept to the millisecond.

use sqlx::SqlitePool;
use tracing::debug;

use salon_core::store::TransactionFilter;
use salon_core::validation::validate_id;
use salon_core::{CustomerRef, LineItem, Money, PaymentMethod, TherapistRef, TransactionRecord};

use super::{from_millis, to_millis};
use crate::error::{DbError, DbResult};

/// Row shape of the `transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    occurred_at: i64,
    customer_id: String,
    customer_name: String,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    therapist_id: String,
    therapist_name: String,
    therapist_role: String,
    items_json: String,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_method: String,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        let items: Vec<LineItem> = serde_json::from_str(&row.items_json)?;
        let payment_method: PaymentMethod = row.payment_method.parse().map_err(|_| {
            DbError::Serialization(format!(
                "transaction {} has payment method '{}'",
                row.id, row.payment_method
            ))
        })?;

        Ok(TransactionRecord {
            date: from_millis(row.occurred_at)?,
            customer: CustomerRef {
                id: row.customer_id,
                name: row.customer_name,
                phone: row.customer_phone,
                email: row.customer_email,
            },
            therapist: TherapistRef {
                id: row.therapist_id,
                name: row.therapist_name,
                role: row.therapist_role,
            },
            items,
            subtotal: Money::from_cents(row.subtotal_cents),
            discount: Money::from_cents(row.discount_cents),
            total: Money::from_cents(row.total_cents),
            payment_method,
            id: row.id,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, occurred_at,
        customer_id, customer_name, customer_phone, customer_email,
        therapist_id, therapist_name, therapist_role,
        items_json, subtotal_cents, discount_cents, total_cents, payment_method
    FROM transactions
"#;

/// Repository for completed transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Appends a completed transaction in a single statement.
    ///
    /// ## Errors
    /// - `DbError::Core` when the totals don't agree or the id is blank
    /// - `DbError::UniqueViolation` when the id is already stored
    pub async fn insert(&self, record: &TransactionRecord) -> DbResult<()> {
        validate_id("transaction id", &record.id)?;
        record.validate_totals()?;
        let items_json = serde_json::to_string(&record.items)?;

        debug!(
            id = %record.id,
            therapist_id = %record.therapist.id,
            total = %record.total,
            "Inserting transaction"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, occurred_at,
                customer_id, customer_name, customer_phone, customer_email,
                therapist_id, therapist_name, therapist_role,
                items_json, subtotal_cents, discount_cents, total_cents, payment_method
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&record.id)
        .bind(to_millis(record.date))
        .bind(&record.customer.id)
        .bind(&record.customer.name)
        .bind(record.customer.phone.as_deref())
        .bind(record.customer.email.as_deref())
        .bind(&record.therapist.id)
        .bind(&record.therapist.name)
        .bind(&record.therapist.role)
        .bind(items_json)
        .bind(record.subtotal.cents())
        .bind(record.discount.cents())
        .bind(record.total.cents())
        .bind(record.payment_method.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { .. } => {
                    Err(DbError::duplicate("transaction id", &record.id))
                }
                other => Err(other),
            },
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransactionRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TransactionRecord::try_from).transpose()
    }

    /// Transactions matching `filter`, oldest first.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<Vec<TransactionRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS}
            WHERE (?1 IS NULL OR therapist_id = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR occurred_at >= ?3)
              AND (?4 IS NULL OR occurred_at <= ?4)
            ORDER BY occurred_at, id"
        );

        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(filter.therapist_id.as_deref())
            .bind(filter.customer_id.as_deref())
            .bind(filter.range.map(|range| to_millis(range.start)))
            .bind(filter.range.map(|range| to_millis(range.end)))
            .fetch_all(&self.pool)
            .await?;

        debug!(rows = rows.len(), "Listed transactions");

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
