//! # Validation Module
//!
//! Input validation utilities for the salon back office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms                                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: salon-core (THIS MODULE)                                     │
//! │  └── Business rule validation, the authoritative check                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (therapist_id, work_date)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Hours validation lives on [`Hours::from_f64`](crate::types::Hours::from_f64).

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TherapistProfile;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity id (therapist, customer, service).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be at most 64 characters".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (customer, therapist, service).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be at most 200 characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::out_of_range(
            "quantity",
            1,
            MAX_ITEM_QUANTITY,
        ));
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (complimentary services).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::out_of_range("price", 0, i64::MAX));
    }

    Ok(())
}

/// Validates a fixed discount amount (voucher or custom).
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_discount_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "discount amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate expressed in basis points (0..=10000).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::out_of_range(field, 0, 10000));
    }

    Ok(())
}

/// Validates a therapist profile before it enters the staff directory.
///
/// ## Rules
/// - id and name present
/// - hourly rate strictly positive
pub fn validate_therapist_profile(profile: &TherapistProfile) -> ValidationResult<()> {
    validate_id("therapist id", &profile.id)?;
    validate_name("therapist name", &profile.name)?;

    if !profile.hourly_rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "hourly rate".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmploymentType;

    fn profile(rate: i64) -> TherapistProfile {
        TherapistProfile {
            id: "t1".to_string(),
            name: "Bea".to_string(),
            role: "stylist".to_string(),
            employment_type: EmploymentType::Employed,
            hourly_rate: Money::from_cents(rate),
        }
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("therapist id", "t-1").is_ok());
        assert!(validate_id("therapist id", "   ").is_err());
        assert!(validate_id("therapist id", &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_and_discount() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());

        assert!(validate_discount_amount(Money::from_cents(1)).is_ok());
        assert!(validate_discount_amount(Money::zero()).is_err());
        assert!(validate_discount_amount(Money::from_cents(-500)).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps("rate", 0).is_ok());
        assert!(validate_rate_bps("rate", 10000).is_ok());
        assert!(validate_rate_bps("rate", 10001).is_err());
    }

    #[test]
    fn test_validate_therapist_profile() {
        assert!(validate_therapist_profile(&profile(1200)).is_ok());
        assert!(matches!(
            validate_therapist_profile(&profile(0)),
            Err(ValidationError::MustBePositive { .. })
        ));
    }
}
