//! # Report Service
//!
//! Fetch-then-compute: each report pulls rows through the repositories and
//! hands them to the pure functions in salon-core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_commission("t1", June)                                       │
//! │       │                                                                 │
//! │       ├── therapists().get_by_id("t1")      ─┐                          │
//! │       ├── transactions().list(t1, June)      ├─ salon-db (async, SQL)   │
//! │       └── hours().total_hours(t1, June)     ─┘                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_profile → revenue_total → compute_commission   salon-core      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use tracing::{debug, info};

use salon_core::aggregation::{aggregate, daily_revenue, revenue_total, DailyRevenue};
use salon_core::commission::{compute_commission, resolve_profile};
use salon_core::hours::{hours_by_therapist, TherapistHours};
use salon_core::store::{HoursFilter, StaffRoster, TransactionFilter};
use salon_core::validation::validate_id;
use salon_core::{
    CommissionResult, DateRange, Dimension, GroupTotal, Hours, HoursEntry, SalonConfig,
};

use crate::error::DbResult;
use crate::pool::Database;

/// Reports and ledger writes that combine several repositories.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
    config: SalonConfig,
}

impl ReportService {
    pub fn new(db: Database, config: SalonConfig) -> Self {
        ReportService { db, config }
    }

    pub fn config(&self) -> &SalonConfig {
        &self.config
    }

    /// Payroll breakdown for one therapist over `range`.
    ///
    /// ## Errors
    /// - `DbError::Core(CoreError::NotFound)` for an unknown therapist under
    ///   the default reject policy
    pub async fn calculate_commission(
        &self,
        therapist_id: &str,
        range: &DateRange,
    ) -> DbResult<CommissionResult> {
        let found = self.db.therapists().get_by_id(therapist_id).await?;
        let profile = resolve_profile(found, therapist_id, self.config.unknown_therapist)?;

        let transactions = self
            .db
            .transactions()
            .list(&TransactionFilter::for_therapist(therapist_id, *range))
            .await?;
        let revenue = revenue_total(&transactions);

        let hours = self
            .db
            .hours()
            .total_hours(therapist_id, range.first_day(), range.last_day())
            .await?;

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

    /// Commission for every therapist on file, ordered by name.
    pub async fn payroll_summary(&self, range: &DateRange) -> DbResult<Vec<CommissionResult>> {
        let therapists = self.db.therapists().list().await?;
        let mut results = Vec::with_capacity(therapists.len());

        for therapist in &therapists {
            results.push(self.calculate_commission(&therapist.id, range).await?);
        }

        info!(
            therapists = results.len(),
            start = %range.start,
            end = %range.end,
            "Built payroll summary"
        );
        Ok(results)
    }

    /// Hours per therapist over the inclusive day window, names joined from
    /// the staff directory.
    pub async fn hours_by_therapist_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<TherapistHours>> {
        let entries = self.db.hours().list(&HoursFilter::between(from, to)).await?;
        let roster = self.staff_roster().await?;

        Ok(hours_by_therapist(&entries, &roster))
    }

    /// Revenue grouped along `dimension` for transactions in `range`.
    pub async fn revenue_by(
        &self,
        dimension: Dimension,
        range: &DateRange,
    ) -> DbResult<Vec<GroupTotal>> {
        let transactions = self
            .db
            .transactions()
            .list(&TransactionFilter::in_range(*range))
            .await?;

        Ok(aggregate(&transactions, dimension))
    }

    /// Revenue per calendar day in `range`.
    pub async fn daily_revenue(&self, range: &DateRange) -> DbResult<Vec<DailyRevenue>> {
        let transactions = self
            .db
            .transactions()
            .list(&TransactionFilter::in_range(*range))
            .await?;

        Ok(daily_revenue(&transactions))
    }

    /// Validates and records a day's hours, replacing any earlier value.
    pub async fn record_hours(
        &self,
        therapist_id: &str,
        date: NaiveDate,
        hours: f64,
    ) -> DbResult<HoursEntry> {
        validate_id("therapist id", therapist_id)?;
        let entry = HoursEntry {
            therapist_id: therapist_id.trim().to_string(),
            date,
            hours: Hours::from_f64(hours)?,
        };

        self.db.hours().upsert(&entry).await
    }

    async fn staff_roster(&self) -> DbResult<StaffRoster> {
        let mut roster = StaffRoster::new();
        for profile in self.db.therapists().list().await? {
            roster.insert(profile)?;
        }
        Ok(roster)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::DbConfig;
    use chrono::{TimeZone, Utc};
    use salon_core::config::UnknownTherapistPolicy;
    use salon_core::{
        Cart, CartItem, CoreError, CustomerRef, EmploymentType, Money, PaymentMethod,
        TherapistProfile,
    };

    fn june(from: u32, to: u32) -> DateRange {
        DateRange::for_days(
            NaiveDate::from_ymd_opt(2026, 6, from).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, to).unwrap(),
        )
        .unwrap()
    }

    fn bea() -> TherapistProfile {
        TherapistProfile {
            id: "t1".to_string(),
            name: "Bea".to_string(),
            role: "stylist".to_string(),
            employment_type: EmploymentType::Employed,
            hourly_rate: Money::from_major(10),
        }
    }

    fn cleo() -> TherapistProfile {
        TherapistProfile {
            id: "t2".to_string(),
            name: "Cleo".to_string(),
            role: "beautician".to_string(),
            employment_type: EmploymentType::SelfEmployed,
            hourly_rate: Money::from_major(12),
        }
    }

    /// Rings a single-line sale through the cart and stores it.
    async fn ring_up(
        db: &Database,
        therapist: &TherapistProfile,
        day: u32,
        service: (&str, &str, i64),
    ) {
        let (id, category, pounds) = service;
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            id: id.to_string(),
            name: id.to_string(),
            unit_price: Money::from_major(pounds),
            quantity: 1,
            category: category.to_string(),
        })
        .unwrap();
        cart.select_customer(CustomerRef::new("c1", "Ada"));
        cart.select_therapist(therapist.to_ref());

        let when = Utc.with_ymd_and_hms(2026, 6, day, 11, 0, 0).unwrap();
        let record = cart.checkout(PaymentMethod::Card, when).unwrap();
        db.transactions().insert(&record).await.unwrap();
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.therapists().upsert(&bea()).await.unwrap();
        db.therapists().upsert(&cleo()).await.unwrap();

        ring_up(&db, &bea(), 2, ("colour", "Hair", 300)).await;
        ring_up(&db, &bea(), 9, ("cut", "Hair", 200)).await;
        ring_up(&db, &cleo(), 9, ("facial", "Skin", 500)).await;
        ring_up(&db, &bea(), 20, ("cut", "Hair", 999)).await;

        db
    }

    #[tokio::test]
    async fn test_commission_end_to_end() {
        let db = seeded().await;
        let reports = db.reports(SalonConfig::default());
        reports
            .record_hours("t1", NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(), 8.0)
            .await
            .unwrap();
        reports
            .record_hours("t1", NaiveDate::from_ymd_opt(2026, 6, 9).unwrap(), 12.0)
            .await
            .unwrap();

        let result = reports.calculate_commission("t1", &june(1, 14)).await.unwrap();

        assert_eq!(result.revenue.cents(), 50000);
        assert_eq!(result.hours.as_f64(), 20.0);
        assert_eq!(result.commission.cents(), 2484);
        assert_eq!(result.therapist_share.cents(), 24884);
        assert_eq!(result.salon_share.cents(), 25116);
    }

    #[tokio::test]
    async fn test_unknown_therapist_policy() {
        let db = seeded().await;

        let err = db
            .reports(SalonConfig::default())
            .calculate_commission("ghost", &june(1, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::NotFound { .. })));

        let lenient = SalonConfig {
            unknown_therapist: UnknownTherapistPolicy::ZeroRate,
            ..SalonConfig::default()
        };
        let result = db
            .reports(lenient)
            .calculate_commission("ghost", &june(1, 30))
            .await
            .unwrap();
        assert_eq!(result.revenue, Money::zero());
        assert_eq!(result.therapist_share, Money::zero());
    }

    #[tokio::test]
    async fn test_payroll_summary() {
        let db = seeded().await;
        let summary = db
            .reports(SalonConfig::default())
            .payroll_summary(&june(1, 14))
            .await
            .unwrap();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].therapist_name, "Bea");
        assert_eq!(summary[1].therapist_share.cents(), 20000);
        assert_eq!(summary[1].salon_share.cents(), 30000);
    }

    #[tokio::test]
    async fn test_revenue_by_dimension() {
        let db = seeded().await;
        let reports = db.reports(SalonConfig::default());

        let by_category = reports
            .revenue_by(Dimension::Category, &june(1, 14))
            .await
            .unwrap();
        assert_eq!(by_category[0].key, "Hair");
        assert_eq!(by_category[0].total_amount.cents(), 50000);
        assert_eq!(by_category[0].transaction_count, 2);
        assert_eq!(by_category[1].key, "Skin");

        let by_therapist = reports
            .revenue_by(Dimension::Therapist, &june(1, 30))
            .await
            .unwrap();
        let total: Money = by_therapist.iter().map(|g| g.total_amount).sum();
        assert_eq!(total.cents(), 30000 + 20000 + 50000 + 99900);

        let days = reports.daily_revenue(&june(1, 14)).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].total.cents(), 70000);
    }

    #[tokio::test]
    async fn test_hours_report_flags_unknown() {
        let db = seeded().await;
        let reports = db.reports(SalonConfig::default());
        let day = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();

        reports.record_hours("t2", day, 6.5).await.unwrap();
        reports.record_hours("ghost", day, 2.0).await.unwrap();
        assert!(reports.record_hours("t1", day, 3.25).await.is_err());

        let rows = reports.hours_by_therapist_in_range(day, day).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Cleo");
        assert_eq!(rows[0].hours.as_f64(), 6.5);
        assert_eq!(rows[1].name, "Unknown");
    }
}
