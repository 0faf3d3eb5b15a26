//! # Validation Module
//!
//! Input validation utilities for the store admin.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard (browser)                                          │
//! │  ├── Required inputs, numeric fields                                   │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: store-api handler (Rust)                                     │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use store_core::validation::{validate_item_name, validate_quantity};
//!
//! assert_eq!(validate_item_name("  Basmati Rice ").unwrap(), "Basmati Rice");
//! assert!(validate_quantity("quantity", 0.5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{
    DEFAULT_CATEGORY, MAX_BILL_LINES, MAX_IMAGE_BYTES, MAX_LINE_QUANTITY,
    ROUNDING_TOLERANCE_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted category, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Longest accepted search term, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Must not be empty
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates an item category.
///
/// A blank category falls back to [`DEFAULT_CATEGORY`].
///
/// ```rust
/// use store_core::validation::validate_category;
///
/// assert_eq!(validate_category(" Dairy ").unwrap(), "Dairy");
/// assert_eq!(validate_category("").unwrap(), "General");
/// ```
pub fn validate_category(category: &str) -> ValidationResult<String> {
    let category = category.trim();

    if category.is_empty() {
        return Ok(DEFAULT_CATEGORY.to_string());
    }

    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LENGTH,
        });
    }

    Ok(category.to_string())
}

/// Normalizes an item image.
///
/// An empty string means "no image". Anything else is kept verbatim as long
/// as it fits in [`MAX_IMAGE_BYTES`].
pub fn validate_image(image: Option<String>) -> ValidationResult<Option<String>> {
    match image {
        None => Ok(None),
        Some(data) if data.trim().is_empty() => Ok(None),
        Some(data) if data.len() > MAX_IMAGE_BYTES => Err(ValidationError::TooLong {
            field: "image".to_string(),
            max: MAX_IMAGE_BYTES,
        }),
        Some(data) => Ok(Some(data)),
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Blank means "no filter" and yields `None`
/// - Maximum 100 characters
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let query = match query.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(q) => q,
    };

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(Some(query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price: it must be strictly positive.
///
/// ## Example
/// ```rust
/// use store_core::money::Money;
/// use store_core::validation::validate_rate;
///
/// assert!(validate_rate("rate", Money::from_cents(999)).is_ok());
/// assert!(validate_rate("rate", Money::zero()).is_err());
/// ```
pub fn validate_rate(field: &str, rate: Money) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0); fractions are fine for weighed goods
/// - Must not exceed MAX_LINE_QUANTITY (9999)
pub fn validate_quantity(field: &str, qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a numeric identifier (item id, cashier id, bill id).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Bill Validators
// =============================================================================

/// Validates the number of lines on a bill.
///
/// ## Rules
/// - At least one line
/// - At most MAX_BILL_LINES (100)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::EmptySale);
    }

    if count > MAX_BILL_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BILL_LINES as i64,
        });
    }

    Ok(())
}

/// Checks a line's subtotal against quantity × rate.
///
/// ## Rules
/// - The dashboard rounds each line to cents on its own, so a difference of
///   up to ROUNDING_TOLERANCE_CENTS is accepted
///
/// ```rust
/// use store_core::money::Money;
/// use store_core::validation::validate_line_subtotal;
///
/// let rate = Money::from_cents(1000);
/// assert!(validate_line_subtotal(0, 2.0, rate, Money::from_cents(2000)).is_ok());
/// assert!(validate_line_subtotal(0, 2.0, rate, Money::from_cents(2500)).is_err());
/// ```
pub fn validate_line_subtotal(
    line: usize,
    quantity: f64,
    rate: Money,
    subtotal: Money,
) -> ValidationResult<()> {
    let expected = rate.multiply_quantity(quantity);

    if !subtotal.is_within(expected, ROUNDING_TOLERANCE_CENTS) {
        return Err(ValidationError::SubtotalMismatch {
            line,
            submitted: subtotal,
            expected,
        });
    }

    Ok(())
}

/// Checks a bill total against the sum of its line subtotals.
pub fn validate_total(total: Money, subtotals: &[Money]) -> ValidationResult<()> {
    let expected = subtotals
        .iter()
        .try_fold(Money::zero(), |sum, subtotal| sum.checked_add(*subtotal))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: "line subtotals are too large to add up".to_string(),
        })?;

    if !total.is_within(expected, ROUNDING_TOLERANCE_CENTS) {
        return Err(ValidationError::TotalMismatch {
            submitted: total,
            expected,
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
    fn test_validate_item_name() {
        assert_eq!(validate_item_name("Milk 1L").unwrap(), "Milk 1L");
        assert_eq!(validate_item_name("  Sugar  ").unwrap(), "Sugar");

        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(201)).is_err());
        assert!(validate_item_name(&"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_category() {
        assert_eq!(validate_category("Snacks").unwrap(), "Snacks");
        assert_eq!(validate_category("   ").unwrap(), DEFAULT_CATEGORY);
        assert!(validate_category(&"c".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_image() {
        assert_eq!(validate_image(None).unwrap(), None);
        assert_eq!(validate_image(Some(String::new())).unwrap(), None);
        assert_eq!(
            validate_image(Some("data:image/jpeg;base64,AAAA".to_string())).unwrap(),
            Some("data:image/jpeg;base64,AAAA".to_string())
        );
        assert!(validate_image(Some("x".repeat(MAX_IMAGE_BYTES + 1))).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(None).unwrap(), None);
        assert_eq!(validate_search_query(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_search_query(Some(" rice ")).unwrap(),
            Some("rice".to_string())
        );
        assert!(validate_search_query(Some(&"q".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("rate", Money::from_cents(1)).is_ok());
        assert!(validate_rate("rate", Money::zero()).is_err());
        assert!(validate_rate("rate", Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1.0).is_ok());
        assert!(validate_quantity("quantity", 0.25).is_ok());
        assert!(validate_quantity("quantity", 9999.0).is_ok());

        assert!(validate_quantity("quantity", 0.0).is_err());
        assert!(validate_quantity("quantity", -2.0).is_err());
        assert!(validate_quantity("quantity", 10000.0).is_err());
        assert!(validate_quantity("quantity", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("item_id", 5).is_ok());
        assert!(validate_id("item_id", 0).is_err());
        assert!(validate_id("item_id", -1).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert_eq!(validate_line_count(0), Err(ValidationError::EmptySale));
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(MAX_BILL_LINES).is_ok());
        assert!(validate_line_count(MAX_BILL_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_line_subtotal_tolerance() {
        let rate = Money::from_cents(333);
        // 3 × 3.33 = 9.99; the dashboard may send 10.00
        assert!(validate_line_subtotal(0, 3.0, rate, Money::from_cents(999)).is_ok());
        assert!(validate_line_subtotal(0, 3.0, rate, Money::from_cents(1000)).is_ok());
        assert!(validate_line_subtotal(0, 3.0, rate, Money::from_cents(1001)).is_err());
    }

    #[test]
    fn test_validate_total() {
        let lines = [Money::from_cents(2000), Money::from_cents(550)];
        assert!(validate_total(Money::from_cents(2550), &lines).is_ok());
        assert!(validate_total(Money::from_cents(2551), &lines).is_ok());

        let err = validate_total(Money::from_cents(2600), &lines).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TotalMismatch {
                submitted: Money::from_cents(2600),
                expected: Money::from_cents(2550),
            }
        );
    }

    #[test]
    fn test_validate_total_overflowing_subtotals() {
        let half = Money::from_cents(i64::MAX / 2 + 1);
        let err = validate_total(Money::from_cents(100), &[half, half]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "items"));
    }
}
