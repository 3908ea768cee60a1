//! # Error Types
//!
//! Domain-specific error types for salon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salon-core errors (this file)                                         │
//! │  ├── CoreError        - Preconditions, missing references              │
//! │  └── ValidationError  - Bad input shape or range                       │
//! │                                                                         │
//! │  salon-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Pure functions surface errors directly; nothing is retried

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity (therapist, customer, transaction) is missing.
    ///
    /// ## When This Occurs
    /// - Commission requested for a therapist id the staff directory
    ///   doesn't know, with `UnknownTherapistPolicy::Reject`
    /// - Cart line update for an item that isn't in the cart
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An operation was attempted before its required selections were made.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: 2 services, customer selected, no therapist
    ///      │
    ///      ▼
    /// checkout()
    ///      │
    ///      ▼
    /// Precondition { missing: "therapist" }
    ///      │
    ///      ▼
    /// UI shows: "Select a therapist before checkout", cart untouched
    /// ```
    #[error("Cannot proceed: no {missing} selected")]
    Precondition { missing: String },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Configuration could not be parsed or holds impossible values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Precondition error naming the missing selection.
    pub fn precondition(missing: impl Into<String>) -> Self {
        CoreError::Precondition {
            missing: missing.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// A failed validation never leaves partially applied state behind.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// NaN or infinity where a number was expected.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Hours must be whole or half hours.
    #[error("{field} must be in 30 minute increments, got {value}")]
    NotHalfHourIncrement { field: String, value: f64 },

    /// Invalid format (e.g., unparsable amount, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub(crate) fn out_of_range(
        field: impl Into<String>,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found("Therapist", "t-42");
        assert_eq!(err.to_string(), "Therapist not found: t-42");

        let err = CoreError::precondition("therapist");
        assert_eq!(err.to_string(), "Cannot proceed: no therapist selected");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::out_of_range("hours", 0, 24);
        assert_eq!(err.to_string(), "hours must be between 0 and 24");

        let err = ValidationError::NotHalfHourIncrement {
            field: "hours".to_string(),
            value: 7.25,
        };
        assert_eq!(
            err.to_string(),
            "hours must be in 30 minute increments, got 7.25"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "therapist_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
