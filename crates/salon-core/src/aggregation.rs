//! # Revenue Aggregation
//!
//! Groups transactions into per-key totals for the reporting screens.
//!
//! ## One Reducer, Four Dimensions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  aggregate_by(records, entries_fn)                                      │
//! │                                                                         │
//! │  Therapist ─┐                                                           │
//! │  Customer  ─┴─► one entry per transaction:  amount = txn.total          │
//! │                                                                         │
//! │  Service   ───► one entry per line:                                     │
//! │                 item_total - item_total × (txn.discount / items_total)  │
//! │                                                                         │
//! │  Category  ───► one entry per line:  line amount - line discount        │
//! │                                                                         │
//! │  Amounts accumulate as Decimal; each group is rounded once at the end.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Output is sorted by `total_amount`, highest first. Ties keep the order in
//! which the keys were first seen.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::range::DateRange;
use crate::types::TransactionRecord;

/// What to group revenue by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Therapist,
    Customer,
    Service,
    Category,
}

/// A single contribution produced by an entries function.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub key: String,
    pub label: String,
    pub amount: Decimal,
}

impl GroupEntry {
    pub fn new(key: impl Into<String>, label: impl Into<String>, amount: Decimal) -> Self {
        GroupEntry {
            key: key.into(),
            label: label.into(),
            amount,
        }
    }
}

/// Revenue total for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupTotal {
    pub key: String,
    /// Display label taken from the first record seen for this key.
    pub label: String,
    pub total_amount: Money,
    /// Records that contributed at least one entry to this key.
    pub transaction_count: u32,
}

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: Money,
    pub transaction_count: u32,
}

struct Accumulator {
    key: String,
    label: String,
    amount: Decimal,
    count: u32,
}

/// Generic grouping reducer.
///
/// `entries` maps each record to zero or more `(key, label, amount)` entries.
/// A record counts once towards `transaction_count` of every key it touches,
/// however many entries it yields for that key.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use salon_core::aggregation::{aggregate_by, GroupEntry};
///
/// let orders = [("ann", 300), ("bob", 500), ("ann", 400)];
/// let totals = aggregate_by(&orders, |(who, pence)| {
///     [GroupEntry::new(*who, *who, Decimal::new(*pence, 2))]
/// });
///
/// assert_eq!(totals[0].key, "ann");
/// assert_eq!(totals[0].total_amount.cents(), 700);
/// assert_eq!(totals[0].transaction_count, 2);
/// ```
pub fn aggregate_by<'a, R, F, I>(
    records: impl IntoIterator<Item = &'a R>,
    entries: F,
) -> Vec<GroupTotal>
where
    R: 'a,
    F: Fn(&'a R) -> I,
    I: IntoIterator<Item = GroupEntry>,
{
    let mut groups: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let mut touched: HashSet<usize> = HashSet::new();

        for entry in entries(record) {
            let slot = match index.get(&entry.key) {
                Some(slot) => *slot,
                None => {
                    groups.push(Accumulator {
                        key: entry.key.clone(),
                        label: entry.label,
                        amount: Decimal::ZERO,
                        count: 0,
                    });
                    index.insert(entry.key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let group = &mut groups[slot];
            group.amount += entry.amount;
            if touched.insert(slot) {
                group.count += 1;
            }
        }
    }

    // Stable: equal totals stay in first-seen order
    groups.sort_by(|a, b| b.amount.cmp(&a.amount));

    groups
        .into_iter()
        .map(|group| GroupTotal {
            key: group.key,
            label: group.label,
            total_amount: Money::from_decimal(group.amount),
            transaction_count: group.count,
        })
        .collect()
}

/// Groups transactions along one of the standard dimensions.
pub fn aggregate<'a>(
    transactions: impl IntoIterator<Item = &'a TransactionRecord>,
    dimension: Dimension,
) -> Vec<GroupTotal> {
    match dimension {
        Dimension::Therapist => aggregate_by(transactions, |txn: &TransactionRecord| {
            [GroupEntry::new(
                txn.therapist.id.as_str(),
                txn.therapist.name.as_str(),
                txn.total.to_decimal(),
            )]
        }),
        Dimension::Customer => aggregate_by(transactions, |txn: &TransactionRecord| {
            [GroupEntry::new(
                txn.customer.id.as_str(),
                txn.customer.name.as_str(),
                txn.total.to_decimal(),
            )]
        }),
        Dimension::Service => aggregate_by(transactions, service_entries),
        Dimension::Category => aggregate_by(transactions, |txn: &TransactionRecord| {
            txn.items
                .iter()
                .map(|item| {
                    GroupEntry::new(
                        item.category.as_str(),
                        item.category.as_str(),
                        item.net_amount().to_decimal(),
                    )
                })
                .collect::<Vec<_>>()
        }),
    }
}

/// Line entries with the transaction discount spread in proportion to each
/// line's share of the items total.
fn service_entries(txn: &TransactionRecord) -> Vec<GroupEntry> {
    let items_total = txn.items_total().to_decimal();
    let ratio = if items_total.is_zero() {
        Decimal::ZERO
    } else {
        txn.discount.to_decimal() / items_total
    };

    txn.items
        .iter()
        .map(|item| {
            let item_total = item.net_amount().to_decimal();
            let item_discount = item_total * ratio;
            GroupEntry::new(
                item.name.as_str(),
                item.name.as_str(),
                item_total - item_discount,
            )
        })
        .collect()
}

/// Transactions whose timestamp falls inside `range` (both ends inclusive).
pub fn filter_by_range<'a>(
    transactions: impl IntoIterator<Item = &'a TransactionRecord>,
    range: &DateRange,
) -> Vec<&'a TransactionRecord> {
    transactions
        .into_iter()
        .filter(|txn| range.contains(txn.date))
        .collect()
}

/// Sum of `total` over all transactions.
pub fn revenue_total<'a>(transactions: impl IntoIterator<Item = &'a TransactionRecord>) -> Money {
    transactions.into_iter().map(|txn| txn.total).sum()
}

/// Revenue per calendar day (UTC), oldest day first. Days without
/// transactions are omitted.
pub fn daily_revenue<'a>(
    transactions: impl IntoIterator<Item = &'a TransactionRecord>,
) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, (Money, u32)> = BTreeMap::new();
    for txn in transactions {
        let day = days.entry(txn.date.date_naive()).or_default();
        day.0 += txn.total;
        day.1 += 1;
    }

    days.into_iter()
        .map(|(date, (total, transaction_count))| DailyRevenue {
            date,
            total,
            transaction_count,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomerRef, LineItem, PaymentMethod, TherapistRef};
    use chrono::{TimeZone, Utc};

    fn item(name: &str, category: &str, price: i64, qty: i64, line_discount: i64) -> LineItem {
        LineItem {
            name: name.to_string(),
            category: category.to_string(),
            unit_price: Money::from_cents(price),
            quantity: qty,
            line_discount: Money::from_cents(line_discount),
        }
    }

    fn txn(
        therapist: &str,
        customer: &str,
        day: u32,
        items: Vec<LineItem>,
        discount: i64,
    ) -> TransactionRecord {
        let subtotal: Money = items.iter().map(LineItem::net_amount).sum();
        let discount = Money::from_cents(discount);
        TransactionRecord {
            id: format!("{therapist}-{customer}-{day}"),
            date: Utc.with_ymd_and_hms(2026, 5, day, 10, 30, 0).unwrap(),
            customer: CustomerRef::new(customer, format!("Customer {customer}")),
            therapist: TherapistRef {
                id: therapist.to_string(),
                name: format!("Therapist {therapist}"),
                role: "therapist".to_string(),
            },
            items,
            subtotal,
            discount,
            total: subtotal - discount,
            payment_method: PaymentMethod::Card,
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            txn(
                "t1",
                "c1",
                1,
                vec![item("Cut", "Hair", 3000, 1, 0), item("Colour", "Hair", 6000, 1, 0)],
                900,
            ),
            txn("t2", "c2", 1, vec![item("Facial", "Skin", 4500, 1, 0)], 0),
            txn(
                "t1",
                "c2",
                2,
                vec![item("Cut", "Hair", 3000, 2, 500), item("Polish", "Nails", 1000, 1, 0)],
                1000,
            ),
        ]
    }

    #[test]
    fn test_by_therapist_uses_net_total() {
        let txns = sample();
        let groups = aggregate(&txns, Dimension::Therapist);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "t1");
        assert_eq!(groups[0].label, "Therapist t1");
        // (9000 - 900) + (6500 - 1000)
        assert_eq!(groups[0].total_amount.cents(), 13600);
        assert_eq!(groups[0].transaction_count, 2);
        assert_eq!(groups[1].total_amount.cents(), 4500);
    }

    #[test]
    fn test_conservation_across_person_groupings() {
        let txns = sample();
        let expected = revenue_total(&txns);

        for dimension in [Dimension::Therapist, Dimension::Customer] {
            let sum: Money = aggregate(&txns, dimension)
                .iter()
                .map(|g| g.total_amount)
                .sum();
            assert_eq!(sum, expected, "{dimension:?}");
        }
    }

    #[test]
    fn test_by_service_allocates_discount_proportionally() {
        let txns = sample();
        let groups = aggregate(&txns, Dimension::Service);
        let get = |name: &str| groups.iter().find(|g| g.key == name).unwrap();

        // txn1: ratio 900/9000 = 0.1 → Cut 2700, Colour 5400
        // txn3: items 5500 + 1000 = 6500, ratio 1000/6500
        //       Cut 5500 - 846.15.. = 4653.846.., Polish 1000 - 153.84.. = 846.153..
        assert_eq!(get("Colour").total_amount.cents(), 5400);
        assert_eq!(get("Cut").total_amount.cents(), 2700 + 4654);
        assert_eq!(get("Cut").transaction_count, 2);
        assert_eq!(get("Polish").total_amount.cents(), 846);
        assert_eq!(get("Facial").total_amount.cents(), 4500);

        let sum: i64 = groups.iter().map(|g| g.total_amount.cents()).sum();
        assert_eq!(sum, revenue_total(&txns).cents());
    }

    #[test]
    fn test_by_service_zero_items_total() {
        let free = txn("t1", "c1", 3, vec![item("Consultation", "Other", 0, 1, 0)], 0);
        let groups = aggregate([&free], Dimension::Service);
        assert_eq!(groups[0].total_amount, Money::zero());
        assert_eq!(groups[0].transaction_count, 1);
    }

    #[test]
    fn test_by_category_uses_line_net_amount() {
        let txns = sample();
        let groups = aggregate(&txns, Dimension::Category);

        assert_eq!(groups[0].key, "Hair");
        assert_eq!(groups[0].total_amount.cents(), 3000 + 6000 + 5500);
        // Counted once per transaction, not per line
        assert_eq!(groups[0].transaction_count, 2);
        assert_eq!(groups[1].key, "Skin");
        assert_eq!(groups[2].key, "Nails");
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let txns = vec![
            txn("b", "c1", 1, vec![item("X", "X", 1000, 1, 0)], 0),
            txn("a", "c1", 1, vec![item("Y", "Y", 1000, 1, 0)], 0),
        ];
        let groups = aggregate(&txns, Dimension::Therapist);
        assert_eq!(groups[0].key, "b");
        assert_eq!(groups[1].key, "a");
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<TransactionRecord> = vec![];
        assert!(aggregate(&none, Dimension::Service).is_empty());
        assert_eq!(revenue_total(&none), Money::zero());
        assert!(daily_revenue(&none).is_empty());
    }

    #[test]
    fn test_filter_and_daily_revenue() {
        let txns = sample();
        let day1 = DateRange::day(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());

        let filtered = filter_by_range(&txns, &day1);
        assert_eq!(filtered.len(), 2);

        let days = daily_revenue(&txns);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        assert_eq!(days[0].total.cents(), 8100 + 4500);
        assert_eq!(days[0].transaction_count, 2);
        assert_eq!(days[1].total.cents(), 5500);
    }
}
