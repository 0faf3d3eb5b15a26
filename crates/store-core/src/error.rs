//! # Error Types
//!
//! Domain-specific error types for store-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  store-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  store-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  store-api errors (in app)                                             │
//! │  └── ApiError         - What the dashboard sees (JSON body + status)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Dashboard    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item is still referenced by recorded bills.
    ///
    /// ## When This Occurs
    /// - Admin tries to delete an item that has been sold at least once
    /// - The bill history would lose the item it points at
    #[error("Item {item_id} is used by {usage_count} bill line(s) and cannot be deleted")]
    ItemInUse { item_id: i64, usage_count: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request body doesn't meet requirements.
/// They are raised before anything touches the database.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Several required fields are missing at once.
    #[error("Missing data! Need {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable amount, unknown unit).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A bill must carry at least one line.
    #[error("items must contain at least one line")]
    EmptySale,

    /// A line's subtotal does not match quantity × rate.
    #[error("items[{line}].subtotal is {submitted} but quantity × rate is {expected}")]
    SubtotalMismatch {
        line: usize,
        submitted: Money,
        expected: Money,
    },

    /// The bill total does not match the sum of its lines.
    #[error("total_amount is {submitted} but the line subtotals add up to {expected}")]
    TotalMismatch { submitted: Money, expected: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Checks whether an item can be removed from the catalog.
///
/// Items that appear on any bill line are kept so the sales history stays
/// joinable.
pub fn check_deletable(item_id: i64, usage_count: i64) -> CoreResult<()> {
    if usage_count > 0 {
        return Err(CoreError::ItemInUse {
            item_id,
            usage_count,
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

    #[test]
    fn test_error_messages() {
        let err = CoreError::ItemInUse {
            item_id: 5,
            usage_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Item 5 is used by 3 bill line(s) and cannot be deleted"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MissingFields {
            fields: vec!["cashier_id".to_string(), "items".to_string()],
        };
        assert_eq!(err.to_string(), "Missing data! Need cashier_id, items");

        let err = ValidationError::TotalMismatch {
            submitted: Money::from_cents(2100),
            expected: Money::from_cents(2000),
        };
        assert_eq!(
            err.to_string(),
            "total_amount is 21.00 but the line subtotals add up to 20.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptySale.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_check_deletable() {
        assert!(check_deletable(1, 0).is_ok());
        assert!(matches!(
            check_deletable(1, 2),
            Err(CoreError::ItemInUse {
                item_id: 1,
                usage_count: 2
            })
        ));
    }
}
