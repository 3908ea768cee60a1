//! # Cart
//!
//! The till's working cart: lines, one transaction discount, and the
//! customer/therapist selections that checkout needs.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action          Cart Operation          State Change          │
//! │  ───────────────          ──────────────          ────────────          │
//! │                                                                         │
//! │  Pick service ──────────► add_item() ───────────► lines merged by id    │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ────► qty = n (0 removes)   │
//! │                                                                         │
//! │  10% button ────────────► apply_percentage() ───► Discount::Percentage  │
//! │  Voucher / custom ──────► apply_voucher() ──────► Discount::Voucher     │
//! │                           apply_custom() ───────► Discount::Custom      │
//! │                                                                         │
//! │  Pick customer/staff ───► select_customer() ────► customer = Some(..)   │
//! │                           select_therapist() ───► therapist = Some(..)  │
//! │                                                                         │
//! │  Take payment ──────────► checkout() ───────────► TransactionRecord,    │
//! │                                                   cart reset            │
//! │                                                                         │
//! │  NOTE: every rejected operation leaves the cart exactly as it was.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! The discount is stored as the operator's intent and resolved against the
//! current subtotal whenever totals are computed, so adding a line after a
//! percentage discount still discounts the new line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::config::DiscountConfig;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CustomerRef, LineItem, PaymentMethod, TherapistRef, TransactionRecord};
use crate::validation::{
    validate_discount_amount, validate_id, validate_name, validate_price, validate_quantity,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A service or retail line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Catalog id; lines with the same id are merged.
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub category: String,
}

impl CartItem {
    /// `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The transaction-level discount chosen by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    #[default]
    None,
    /// Whole percentage of the subtotal.
    Percentage { pct: u32 },
    /// Fixed amount, capped at the subtotal.
    Voucher { amount: Money, code: Option<String> },
    /// Fixed amount keyed in by the operator, capped at the subtotal.
    Custom { amount: Money },
}

impl Discount {
    /// Amount this discount takes off `subtotal`, never more than `subtotal`.
    pub fn amount_for(&self, subtotal: Money) -> Money {
        let subtotal = subtotal.clamp_non_negative();
        let amount = match self {
            Discount::None => Money::zero(),
            // deserialized values skip the preset check
            Discount::Percentage { pct } => subtotal.percentage_bps((*pct).min(100) * 100),
            Discount::Voucher { amount, .. } | Discount::Custom { amount } => *amount,
        };
        amount.clamp_non_negative().min(subtotal)
    }
}

/// The cart being rung up.
///
/// ## Invariants
/// - Lines are unique by `id`
/// - Every line has 1..=MAX_ITEM_QUANTITY quantity
/// - At most MAX_CART_ITEMS lines
/// - `0 <= discount_amount <= subtotal`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    items: Vec<CartItem>,
    discount: Discount,
    customer: Option<CustomerRef>,
    therapist: Option<TherapistRef>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    pub fn customer(&self) -> Option<&CustomerRef> {
        self.customer.as_ref()
    }

    pub fn therapist(&self) -> Option<&TherapistRef> {
        self.therapist.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line, or increases the quantity of the line with the same id.
    ///
    /// ## Errors
    /// - `ValidationError` for a blank id/name, negative price, or a
    ///   quantity outside 1..=MAX_ITEM_QUANTITY (including after merging)
    /// - `CoreError::CartTooLarge` when a new line would exceed MAX_CART_ITEMS
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        validate_id("item id", &item.id)?;
        validate_name("item name", &item.name)?;
        validate_price(item.unit_price)?;
        validate_quantity(item.quantity)?;

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            let merged = existing.quantity + item.quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(ValidationError::out_of_range("quantity", 1, MAX_ITEM_QUANTITY).into());
            }
            existing.quantity = merged;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(item);
        Ok(())
    }

    /// Sets a line's quantity; 0 removes the line.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == item_id)
            .ok_or_else(|| CoreError::not_found("Cart item", item_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|line| line.id != item_id);

        if self.items.len() == before {
            Err(CoreError::not_found("Cart item", item_id))
        } else {
            Ok(())
        }
    }

    /// Empties the cart: lines, discount and selections.
    pub fn clear(&mut self) {
        *self = Cart::default();
    }

    /// Σ `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Applies one of the configured percentage presets.
    ///
    /// ## Errors
    /// `ValidationError::NotAllowed` listing the presets when `pct` isn't one.
    pub fn apply_percentage(&mut self, pct: u32, config: &DiscountConfig) -> CoreResult<()> {
        if !config.is_allowed(pct) {
            return Err(ValidationError::NotAllowed {
                field: "discount percentage".to_string(),
                allowed: config
                    .percentage_presets
                    .iter()
                    .map(|p| format!("{p}%"))
                    .collect(),
            }
            .into());
        }
        self.discount = Discount::Percentage { pct };
        Ok(())
    }

    /// Applies a voucher worth `amount`, with its code if the operator scanned one.
    pub fn apply_voucher(&mut self, amount: Money, code: Option<String>) -> CoreResult<()> {
        validate_discount_amount(amount)?;
        let code = code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.discount = Discount::Voucher { amount, code };
        Ok(())
    }

    /// Applies an operator-entered fixed discount.
    pub fn apply_custom(&mut self, amount: Money) -> CoreResult<()> {
        validate_discount_amount(amount)?;
        self.discount = Discount::Custom { amount };
        Ok(())
    }

    pub fn remove_discount(&mut self) {
        self.discount = Discount::None;
    }

    pub fn select_customer(&mut self, customer: CustomerRef) {
        self.customer = Some(customer);
    }

    pub fn select_therapist(&mut self, therapist: TherapistRef) {
        self.therapist = Some(therapist);
    }

    pub fn totals(&self) -> CartTotals {
        compute_cart_totals(self)
    }

    /// Turns the cart into a completed transaction and resets it.
    ///
    /// ## Preconditions
    /// Checked in this order, each failing with `CoreError::Precondition`
    /// and leaving the cart untouched:
    /// 1. `"customer"` selected
    /// 2. `"therapist"` selected
    /// 3. `"items"`: at least one line
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use salon_core::cart::{Cart, CartItem};
    /// use salon_core::money::Money;
    /// use salon_core::types::{CustomerRef, PaymentMethod, TherapistRef};
    ///
    /// let mut cart = Cart::new();
    /// cart.add_item(CartItem {
    ///     id: "svc-cut".into(),
    ///     name: "Cut & Finish".into(),
    ///     unit_price: Money::from_major(50),
    ///     quantity: 1,
    ///     category: "Hair".into(),
    /// })
    /// .unwrap();
    /// cart.apply_voucher(Money::from_major(80), None).unwrap();
    /// cart.select_customer(CustomerRef::new("c1", "Ada"));
    /// cart.select_therapist(TherapistRef {
    ///     id: "t1".into(),
    ///     name: "Bea".into(),
    ///     role: "stylist".into(),
    /// });
    ///
    /// let record = cart.checkout(PaymentMethod::Card, Utc::now()).unwrap();
    /// assert_eq!(record.discount, Money::from_major(50));
    /// assert_eq!(record.total, Money::zero());
    /// assert!(cart.is_empty());
    /// ```
    pub fn checkout(
        &mut self,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> CoreResult<TransactionRecord> {
        let customer = self
            .customer
            .clone()
            .ok_or_else(|| CoreError::precondition("customer"))?;
        let therapist = self
            .therapist
            .clone()
            .ok_or_else(|| CoreError::precondition("therapist"))?;
        if self.items.is_empty() {
            return Err(CoreError::precondition("items"));
        }

        let totals = compute_cart_totals(self);
        let record = TransactionRecord {
            id: Uuid::new_v4().to_string(),
            date: now,
            customer,
            therapist,
            items: self
                .items
                .iter()
                .map(|line| LineItem {
                    name: line.name.clone(),
                    category: line.category.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_discount: Money::zero(),
                })
                .collect(),
            subtotal: totals.subtotal,
            discount: totals.discount_amount,
            total: totals.total,
            payment_method,
        };

        debug!(
            id = %record.id,
            therapist_id = %record.therapist.id,
            customer_id = %record.customer.id,
            lines = record.items.len(),
            total = %record.total,
            "Checked out cart"
        );

        self.clear();
        Ok(record)
    }
}

/// Cart totals for display and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    /// `max(0, subtotal - discount_amount)`
    pub total: Money,
}

/// Resolves the cart's discount against its current subtotal.
pub fn compute_cart_totals(cart: &Cart) -> CartTotals {
    let subtotal = cart.subtotal();
    let discount_amount = cart.discount.amount_for(subtotal);

    CartTotals {
        subtotal,
        discount_amount,
        total: (subtotal - discount_amount).clamp_non_negative(),
    }
}

/// Parses an amount typed at the till (`"12.50"`, `"£5"`).
pub fn parse_amount(input: &str) -> Result<Money, ValidationError> {
    Money::parse(input)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, price_pence: i64, quantity: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Service {id}"),
            unit_price: Money::from_cents(price_pence),
            quantity,
            category: "Hair".to_string(),
        }
    }

    fn therapist() -> TherapistRef {
        TherapistRef {
            id: "t1".to_string(),
            name: "Bea".to_string(),
            role: "stylist".to_string(),
        }
    }

    fn ready_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(item("cut", 4500, 1)).unwrap();
        cart.add_item(item("blow", 1500, 2)).unwrap();
        cart.select_customer(CustomerRef::new("c1", "Ada"));
        cart.select_therapist(therapist());
        cart
    }

    fn assert_invariants(cart: &Cart) {
        let totals = cart.totals();
        assert!(totals.discount_amount >= Money::zero());
        assert!(totals.discount_amount <= totals.subtotal);
        assert_eq!(
            totals.total,
            (totals.subtotal - totals.discount_amount).clamp_non_negative()
        );
    }

    #[test]
    fn test_add_item_merges_same_id() {
        let mut cart = Cart::new();
        cart.add_item(item("cut", 4500, 1)).unwrap();
        cart.add_item(item("cut", 4500, 2)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal().cents(), 13500);
    }

    #[test]
    fn test_add_item_rejects_overflowing_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item("wax", 100, MAX_ITEM_QUANTITY)).unwrap();

        assert!(cart.add_item(item("wax", 100, 1)).is_err());
        assert_eq!(cart.items()[0].quantity, MAX_ITEM_QUANTITY);
        assert!(cart.add_item(item("gel", 100, 0)).is_err());
        assert!(cart.add_item(item("gel", -1, 1)).is_err());
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(item(&format!("svc-{i}"), 100, 1)).unwrap();
        }
        assert!(matches!(
            cart.add_item(item("one-more", 100, 1)),
            Err(CoreError::CartTooLarge { .. })
        ));
        // Merging into an existing line is still fine
        cart.add_item(item("svc-0", 100, 1)).unwrap();
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = ready_cart();

        cart.update_quantity("blow", 3).unwrap();
        assert_eq!(cart.subtotal().cents(), 9000);

        cart.update_quantity("blow", 0).unwrap();
        assert_eq!(cart.items().len(), 1);

        assert!(matches!(
            cart.update_quantity("nope", 2),
            Err(CoreError::NotFound { .. })
        ));
        assert!(cart.remove_item("blow").is_err());
        cart.remove_item("cut").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_percentage_discount() {
        let mut cart = ready_cart();
        cart.apply_percentage(10, &DiscountConfig::default()).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.cents(), 7500);
        assert_eq!(totals.discount_amount.cents(), 750);
        assert_eq!(totals.total.cents(), 6750);

        // Re-resolved against the new subtotal
        cart.add_item(item("toner", 1999, 1)).unwrap();
        assert_eq!(cart.totals().discount_amount.cents(), 950);
        assert_invariants(&cart);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        let mut cart = Cart::new();
        cart.add_item(item("brow", 1250, 1)).unwrap();
        cart.apply_percentage(5, &DiscountConfig::default()).unwrap();

        // 12.50 × 5% = 0.625
        assert_eq!(cart.totals().discount_amount.cents(), 63);
    }

    #[test]
    fn test_percentage_outside_presets_leaves_state() {
        let mut cart = ready_cart();
        cart.apply_custom(Money::from_cents(500)).unwrap();
        let before = cart.clone();

        let err = cart
            .apply_percentage(15, &DiscountConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_voucher_capped_at_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(item("cut", 5000, 1)).unwrap();
        cart.apply_voucher(Money::from_major(80), Some(" GIFT80 ".to_string()))
            .unwrap();

        let totals = compute_cart_totals(&cart);
        assert_eq!(totals.discount_amount.cents(), 5000);
        assert_eq!(totals.total, Money::zero());
        assert_eq!(
            cart.discount(),
            &Discount::Voucher {
                amount: Money::from_major(80),
                code: Some("GIFT80".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_fixed_amounts_leave_state() {
        let mut cart = ready_cart();
        cart.apply_voucher(Money::from_cents(1000), None).unwrap();
        let before = cart.clone();

        assert!(cart.apply_voucher(Money::zero(), None).is_err());
        assert!(cart.apply_custom(Money::from_cents(-200)).is_err());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_discount() {
        let mut cart = ready_cart();
        cart.apply_voucher(Money::from_cents(1000), Some("V1".to_string()))
            .unwrap();
        cart.remove_discount();

        assert_eq!(cart.discount(), &Discount::None);
        assert_eq!(cart.totals().total, cart.subtotal());
    }

    #[test]
    fn test_discount_wire_shape() {
        let json = serde_json::to_value(Discount::Voucher {
            amount: Money::from_cents(500),
            code: None,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "voucher", "amount": 500, "code": null })
        );

        let parsed: Discount = serde_json::from_str(r#"{"type":"percentage","pct":10}"#).unwrap();
        assert_eq!(parsed, Discount::Percentage { pct: 10 });
    }

    #[test]
    fn test_oversized_deserialized_percentage_caps_at_subtotal() {
        let parsed: Discount =
            serde_json::from_str(r#"{"type":"percentage","pct":50000000}"#).unwrap();
        let subtotal = Money::from_major(10);

        assert_eq!(parsed.amount_for(subtotal), subtotal);
        assert_eq!(
            Discount::Percentage { pct: u32::MAX }.amount_for(subtotal),
            subtotal
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap().cents(), 1250);
        assert_eq!(parse_amount("£5").unwrap().cents(), 500);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("1.234").is_err());
    }

    #[test]
    fn test_empty_cart_totals() {
        let mut cart = Cart::new();
        cart.apply_custom(Money::from_cents(300)).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_checkout_requires_selections() {
        let mut cart = ready_cart();
        cart.therapist = None;
        let before = cart.clone();

        let err = cart.checkout(PaymentMethod::Cash, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Precondition { ref missing } if missing == "therapist"));
        assert_eq!(cart, before);

        let mut no_customer = ready_cart();
        no_customer.customer = None;
        assert!(matches!(
            no_customer.checkout(PaymentMethod::Cash, Utc::now()),
            Err(CoreError::Precondition { ref missing }) if missing == "customer"
        ));

        let mut empty = Cart::new();
        empty.select_customer(CustomerRef::new("c1", "Ada"));
        empty.select_therapist(therapist());
        assert!(matches!(
            empty.checkout(PaymentMethod::Cash, Utc::now()),
            Err(CoreError::Precondition { ref missing }) if missing == "items"
        ));
    }

    #[test]
    fn test_checkout_builds_record_and_resets() {
        let mut cart = ready_cart();
        cart.apply_percentage(20, &DiscountConfig::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 15, 30, 0).unwrap();

        let record = cart.checkout(PaymentMethod::Card, now).unwrap();

        assert_eq!(record.date, now);
        assert_eq!(record.subtotal.cents(), 7500);
        assert_eq!(record.discount.cents(), 1500);
        assert_eq!(record.total.cents(), 6000);
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items_total(), record.subtotal);
        assert_eq!(record.therapist.id, "t1");
        assert!(record.validate_totals().is_ok());
        assert!(Uuid::parse_str(&record.id).is_ok());

        assert_eq!(cart, Cart::new());
    }
}
