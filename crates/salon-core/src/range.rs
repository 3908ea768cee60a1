//! # Date Ranges
//!
//! Inclusive reporting windows at timestamp granularity.
//!
//! ```text
//! ThisWeek (anchor Wed 11 Mar, week starts Monday)
//!
//!   Mon 09 00:00:00.000000000 ─────────────────► Sun 15 23:59:59.999999999
//!   start (start_of_day)                          end (end_of_day)
//!
//! A transaction at exactly `start` or exactly `end` is inside the range.
//! ```

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::WeekStart;
use crate::error::ValidationError;

/// First instant of `date` (UTC).
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable instant of `date` (UTC).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next) - Duration::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Quick picks offered by the reporting screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum RangePreset {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisYear,
    /// The anchor day and the `n - 1` days before it.
    LastDays(u32),
}

/// An inclusive `[start, end]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range; `start` must not be after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "date range".to_string(),
                reason: format!("start {start} is after end {end}"),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Whole days `from`..=`to`, from start of the first to end of the last.
    pub fn for_days(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        DateRange::new(start_of_day(from), end_of_day(to))
    }

    /// A single whole day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange {
            start: start_of_day(date),
            end: end_of_day(date),
        }
    }

    /// Resolves a preset around `anchor` (usually today).
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use salon_core::config::WeekStart;
    /// use salon_core::range::{DateRange, RangePreset};
    ///
    /// let wed = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
    /// let week = DateRange::preset(RangePreset::ThisWeek, wed, WeekStart::Monday).unwrap();
    /// assert_eq!(week.first_day(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    /// assert_eq!(week.last_day(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    /// ```
    pub fn preset(
        preset: RangePreset,
        anchor: NaiveDate,
        week_start: WeekStart,
    ) -> Result<Self, ValidationError> {
        let (from, to) = match preset {
            RangePreset::Today => (anchor, anchor),
            RangePreset::Yesterday => {
                let day = anchor.pred_opt().ok_or_else(date_overflow)?;
                (day, day)
            }
            RangePreset::ThisWeek => {
                let offset = (anchor.weekday().num_days_from_monday() + 7
                    - week_start.weekday().num_days_from_monday())
                    % 7;
                let from = anchor
                    .checked_sub_days(Days::new(u64::from(offset)))
                    .ok_or_else(date_overflow)?;
                let to = from.checked_add_days(Days::new(6)).ok_or_else(date_overflow)?;
                (from, to)
            }
            RangePreset::ThisMonth => {
                let from = anchor.with_day(1).ok_or_else(date_overflow)?;
                let next_month = if anchor.month() == 12 {
                    NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(anchor.year(), anchor.month() + 1, 1)
                }
                .ok_or_else(date_overflow)?;
                (from, next_month.pred_opt().ok_or_else(date_overflow)?)
            }
            RangePreset::ThisYear => (
                NaiveDate::from_ymd_opt(anchor.year(), 1, 1).ok_or_else(date_overflow)?,
                NaiveDate::from_ymd_opt(anchor.year(), 12, 31).ok_or_else(date_overflow)?,
            ),
            RangePreset::LastDays(n) => {
                if n == 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "days".to_string(),
                    });
                }
                let from = anchor
                    .checked_sub_days(Days::new(u64::from(n - 1)))
                    .ok_or_else(date_overflow)?;
                (from, anchor)
            }
        };

        DateRange::for_days(from, to)
    }

    /// Inclusive at both ends.
    #[inline]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Calendar day of `start`.
    #[inline]
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Calendar day of `end`.
    #[inline]
    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Whether any part of `date` falls inside the range.
    pub fn contains_day(&self, date: NaiveDate) -> bool {
        self.first_day() <= date && date <= self.last_day()
    }
}

fn date_overflow() -> ValidationError {
    ValidationError::out_of_range("date", NaiveDate::MIN, NaiveDate::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_bounds_are_inclusive() {
        let range = DateRange::day(d(2026, 1, 31));
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap()));
        assert!(range.contains(range.end));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(range.start - Duration::nanoseconds(1)));
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(DateRange::for_days(d(2026, 2, 2), d(2026, 2, 1)).is_err());
    }

    #[test]
    fn test_week_start_sunday() {
        let range = DateRange::preset(RangePreset::ThisWeek, d(2026, 3, 11), WeekStart::Sunday)
            .unwrap();
        assert_eq!(range.first_day(), d(2026, 3, 8));
        assert_eq!(range.last_day(), d(2026, 3, 14));

        // Anchor on the week's first day
        let range = DateRange::preset(RangePreset::ThisWeek, d(2026, 3, 9), WeekStart::Monday)
            .unwrap();
        assert_eq!(range.first_day(), d(2026, 3, 9));
    }

    #[test]
    fn test_month_and_year_presets() {
        let feb = DateRange::preset(RangePreset::ThisMonth, d(2028, 2, 10), WeekStart::Monday)
            .unwrap();
        assert_eq!(feb.first_day(), d(2028, 2, 1));
        assert_eq!(feb.last_day(), d(2028, 2, 29));

        let dec = DateRange::preset(RangePreset::ThisMonth, d(2026, 12, 31), WeekStart::Monday)
            .unwrap();
        assert_eq!(dec.last_day(), d(2026, 12, 31));

        let year = DateRange::preset(RangePreset::ThisYear, d(2026, 6, 1), WeekStart::Monday)
            .unwrap();
        assert_eq!(year.first_day(), d(2026, 1, 1));
        assert_eq!(year.last_day(), d(2026, 12, 31));
    }

    #[test]
    fn test_yesterday_and_last_days() {
        let y = DateRange::preset(RangePreset::Yesterday, d(2026, 3, 1), WeekStart::Monday)
            .unwrap();
        assert_eq!(y.first_day(), d(2026, 2, 28));

        let last7 = DateRange::preset(RangePreset::LastDays(7), d(2026, 3, 7), WeekStart::Monday)
            .unwrap();
        assert_eq!(last7.first_day(), d(2026, 3, 1));
        assert_eq!(last7.last_day(), d(2026, 3, 7));

        assert!(
            DateRange::preset(RangePreset::LastDays(0), d(2026, 3, 7), WeekStart::Monday).is_err()
        );
    }

    #[test]
    fn test_presets_at_calendar_edges_fail_cleanly() {
        let anchor = d(2026, 3, 7);
        assert!(matches!(
            DateRange::preset(RangePreset::LastDays(u32::MAX), anchor, WeekStart::Monday),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(
            DateRange::preset(RangePreset::Yesterday, NaiveDate::MIN, WeekStart::Monday).is_err()
        );

        let last = DateRange::preset(RangePreset::Today, NaiveDate::MAX, WeekStart::Monday)
            .unwrap();
        assert_eq!(last.last_day(), NaiveDate::MAX);
    }

    #[test]
    fn test_last_representable_day() {
        let range = DateRange::day(NaiveDate::MAX);
        assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);
        assert_eq!(range.first_day(), NaiveDate::MAX);
        assert!(range.contains(range.end));

        assert!(DateRange::for_days(NaiveDate::MAX, NaiveDate::MAX).is_ok());
    }
}
