//! # salon-core: Pure Business Logic for the Salon Back Office
//!
//! Money, payroll and checkout rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Salon Back Office                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard / Till                             │   │
//! │  │    Cart UI ──► Checkout ──► Reports ──► Payroll                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │aggregation│  │   hours   │  │commission │  │   │
//! │  │   │ discounts │  │ group by  │  │  ledger   │  │  payroll  │  │   │
//! │  │   │ checkout  │  │ revenue   │  │  upsert   │  │  split    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ store traits                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    salon-db (Database Layer)                    │   │
//! │  │         SQLite repositories, migrations, report service         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TransactionRecord, HoursEntry, TherapistProfile)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`config`] - Rates, discount presets and policies
//! - [`range`] - Inclusive reporting windows and presets
//! - [`store`] - Collaborator traits and in-memory stores
//! - [`aggregation`] - Group-by reducers over transactions
//! - [`hours`] - Hours ledger
//! - [`commission`] - Payroll breakdown per therapist
//! - [`cart`] - Till cart, discounts and checkout
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: persistence sits behind the [`store`] traits
//! 3. **Integer Money**: all stored amounts are pence (i64); payroll math
//!    runs in `Decimal` and rounds once
//! 4. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use salon_core::aggregation::{aggregate, Dimension};
//! use salon_core::cart::{Cart, CartItem};
//! use salon_core::config::DiscountConfig;
//! use salon_core::money::Money;
//! use salon_core::types::{CustomerRef, PaymentMethod, TherapistRef};
//!
//! let mut cart = Cart::new();
//! cart.add_item(CartItem {
//!     id: "svc-colour".into(),
//!     name: "Full Colour".into(),
//!     unit_price: Money::from_major(80),
//!     quantity: 1,
//!     category: "Hair".into(),
//! })
//! .unwrap();
//! cart.apply_percentage(10, &DiscountConfig::default()).unwrap();
//! cart.select_customer(CustomerRef::new("c1", "Ada"));
//! cart.select_therapist(TherapistRef {
//!     id: "t1".into(),
//!     name: "Bea".into(),
//!     role: "colourist".into(),
//! });
//!
//! let sale = cart.checkout(PaymentMethod::Card, chrono::Utc::now()).unwrap();
//! let by_therapist = aggregate([&sale], Dimension::Therapist);
//!
//! assert_eq!(by_therapist[0].total_amount, Money::from_major(72));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregation;
pub mod cart;
pub mod commission;
pub mod config;
pub mod error;
pub mod hours;
pub mod money;
pub mod range;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregation::{aggregate, aggregate_by, Dimension, GroupTotal};
pub use cart::{compute_cart_totals, Cart, CartItem, CartTotals, Discount};
pub use commission::{CommissionEngine, CommissionResult};
pub use config::SalonConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use range::{DateRange, RangePreset};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart
///
/// ## Business Reason
/// Catches slips at the till (typing 100 instead of 1).
pub const MAX_ITEM_QUANTITY: i64 = 99;
