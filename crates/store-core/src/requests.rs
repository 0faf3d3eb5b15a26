//! # Request Payloads
//!
//! What the dashboard sends, and the validated forms the repositories accept.
//!
//! ## Raw vs. Validated
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON body ──serde──► NewItem / ItemChanges / NewSale   (all optional) │
//! │                              │                                          │
//! │                         .validate()                                     │
//! │                              │                                          │
//! │                              ▼                                          │
//! │              ItemDraft / ItemChanges / SaleDraft   (checked, trimmed)  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                     store-db repositories                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are `Option` on the raw side so that a missing field becomes a
//! readable `ValidationError` instead of a serde message.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Unit;
use crate::validation::{
    validate_category, validate_id, validate_image, validate_item_name, validate_line_count,
    validate_line_subtotal, validate_quantity, validate_rate, validate_total, ValidationResult,
};

// =============================================================================
// New Item
// =============================================================================

/// Body of `POST /items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: Option<String>,
    pub rate: Option<Money>,
    pub unit: Option<Unit>,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// A validated item, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub rate: Money,
    pub unit: Unit,
    pub category: String,
    pub image: Option<String>,
}

impl NewItem {
    /// Checks the payload and fills in defaults (`pcs`, `General`).
    pub fn validate(self) -> ValidationResult<ItemDraft> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            missing.push("name".to_string());
        }
        if self.rate.is_none() {
            missing.push("rate".to_string());
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let name = validate_item_name(self.name.as_deref().unwrap_or_default())?;
        let rate = self.rate.unwrap_or_default();
        validate_rate("rate", rate)?;

        Ok(ItemDraft {
            name,
            rate,
            unit: self.unit.unwrap_or_default(),
            category: validate_category(self.category.as_deref().unwrap_or_default())?,
            image: validate_image(self.image)?,
        })
    }
}

// =============================================================================
// Item Changes (partial update)
// =============================================================================

/// Body of `PUT /items/:id`.
///
/// Every field is optional; only the ones present are written. For `image`
/// the three states matter:
///
/// | JSON                 | Meaning              |
/// |----------------------|----------------------|
/// | field absent         | keep current image   |
/// | `null` or `""`       | remove the image     |
/// | `"data:image/..."`   | replace the image    |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub rate: Option<Money>,
    pub unit: Option<Unit>,
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "string | null")]
    pub image: Option<Option<String>>,
}

/// One column assignment of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Name(String),
    Rate(Money),
    Unit(Unit),
    Category(String),
    Image(Option<String>),
}

impl ItemField {
    /// The database column this field is stored in.
    pub const fn column(&self) -> &'static str {
        match self {
            ItemField::Name(_) => "name",
            ItemField::Rate(_) => "rate_cents",
            ItemField::Unit(_) => "unit",
            ItemField::Category(_) => "category",
            ItemField::Image(_) => "image",
        }
    }
}

impl ItemChanges {
    /// Returns true when no recognised field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.rate.is_none()
            && self.unit.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }

    /// Validates the present fields, leaving absent ones absent.
    pub fn validate(self) -> ValidationResult<ItemChanges> {
        let name = self.name.as_deref().map(validate_item_name).transpose()?;

        if let Some(rate) = self.rate {
            validate_rate("rate", rate)?;
        }

        let category = self.category.as_deref().map(validate_category).transpose()?;
        let image = self.image.map(validate_image).transpose()?;

        Ok(ItemChanges {
            name,
            rate: self.rate,
            unit: self.unit,
            category,
            image,
        })
    }

    /// The present fields, in a stable column order.
    pub fn fields(&self) -> Vec<ItemField> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(ItemField::Name(name.clone()));
        }
        if let Some(rate) = self.rate {
            fields.push(ItemField::Rate(rate));
        }
        if let Some(unit) = self.unit {
            fields.push(ItemField::Unit(unit));
        }
        if let Some(category) = &self.category {
            fields.push(ItemField::Category(category.clone()));
        }
        if let Some(image) = &self.image {
            fields.push(ItemField::Image(image.clone()));
        }
        fields
    }
}

/// Distinguishes `"image": null` (Some(None)) from a missing key (None).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// =============================================================================
// New Sale
// =============================================================================

/// Body of `POST /bills`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub cashier_id: Option<i64>,
    pub total_amount: Option<Money>,
    pub items: Option<Vec<SaleLine>>,
}

/// One line of a proposed sale, as computed by the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub item_id: Option<i64>,
    pub quantity: Option<f64>,
    pub rate: Option<Money>,
    pub subtotal: Option<Money>,
}

/// A validated sale, ready to be written as one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub cashier_id: i64,
    pub total_amount: Money,
    pub lines: Vec<SaleLineDraft>,
}

/// A validated bill line.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLineDraft {
    pub item_id: i64,
    pub quantity: f64,
    pub rate: Money,
    pub subtotal: Money,
}

impl NewSale {
    /// Checks a proposed sale before anything is written.
    ///
    /// ## Checks, in order
    /// 1. `cashier_id`, `total_amount` and `items` are present
    /// 2. `items` is not empty and has at most MAX_BILL_LINES lines
    /// 3. every line has a positive item id, quantity and rate
    /// 4. every subtotal matches quantity × rate (within a cent)
    /// 5. the total matches the sum of subtotals (within a cent)
    pub fn validate(self) -> ValidationResult<SaleDraft> {
        let (cashier_id, total_amount, items) = match (self.cashier_id, self.total_amount, self.items)
        {
            (Some(cashier_id), Some(total), Some(items)) => (cashier_id, total, items),
            (cashier_id, total, items) => {
                let fields = [
                    ("cashier_id", cashier_id.is_none()),
                    ("total_amount", total.is_none()),
                    ("items", items.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(field, _)| field.to_string())
                .collect();
                return Err(ValidationError::MissingFields { fields });
            }
        };

        validate_line_count(items.len())?;
        validate_id("cashier_id", cashier_id)?;

        let lines = items
            .into_iter()
            .enumerate()
            .map(|(index, line)| line.validate(index))
            .collect::<ValidationResult<Vec<_>>>()?;

        validate_rate("total_amount", total_amount)?;
        let subtotals: Vec<Money> = lines.iter().map(|line| line.subtotal).collect();
        validate_total(total_amount, &subtotals)?;

        Ok(SaleDraft {
            cashier_id,
            total_amount,
            lines,
        })
    }
}

impl SaleLine {
    fn validate(self, index: usize) -> ValidationResult<SaleLineDraft> {
        let field = |name: &str| format!("items[{index}].{name}");

        let (item_id, quantity, rate, subtotal) =
            match (self.item_id, self.quantity, self.rate, self.subtotal) {
                (Some(item_id), Some(quantity), Some(rate), Some(subtotal)) => {
                    (item_id, quantity, rate, subtotal)
                }
                (item_id, quantity, rate, subtotal) => {
                    let fields = [
                        ("item_id", item_id.is_none()),
                        ("quantity", quantity.is_none()),
                        ("rate", rate.is_none()),
                        ("subtotal", subtotal.is_none()),
                    ]
                    .into_iter()
                    .filter(|(_, missing)| *missing)
                    .map(|(name, _)| field(name))
                    .collect();
                    return Err(ValidationError::MissingFields { fields });
                }
            };

        validate_id(&field("item_id"), item_id)?;
        validate_quantity(&field("quantity"), quantity)?;
        validate_rate(&field("rate"), rate)?;
        validate_line_subtotal(index, quantity, rate, subtotal)?;

        Ok(SaleLineDraft {
            item_id,
            quantity,
            rate,
            subtotal,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale(body: serde_json::Value) -> ValidationResult<SaleDraft> {
        serde_json::from_value::<NewSale>(body).unwrap().validate()
    }

    #[test]
    fn test_new_item_defaults() {
        let item: NewItem = serde_json::from_value(json!({
            "name": "  Toor Dal ",
            "rate": "120.50"
        }))
        .unwrap();

        let draft = item.validate().unwrap();
        assert_eq!(draft.name, "Toor Dal");
        assert_eq!(draft.rate, Money::from_cents(12050));
        assert_eq!(draft.unit, Unit::Piece);
        assert_eq!(draft.category, "General");
        assert_eq!(draft.image, None);
    }

    #[test]
    fn test_new_item_missing_fields() {
        let err = NewItem::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["name".to_string(), "rate".to_string()]
            }
        );

        let item: NewItem = serde_json::from_value(json!({"name": "Salt", "rate": 0})).unwrap();
        assert!(matches!(
            item.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_item_changes_image_states() {
        let absent: ItemChanges = serde_json::from_value(json!({"rate": 9.99})).unwrap();
        assert_eq!(absent.image, None);

        let cleared: ItemChanges = serde_json::from_value(json!({"image": null})).unwrap();
        assert_eq!(cleared.image, Some(None));

        let blank: ItemChanges = serde_json::from_value(json!({"image": ""})).unwrap();
        assert_eq!(blank.validate().unwrap().image, Some(None));
    }

    #[test]
    fn test_item_changes_fields_only_present() {
        let changes = serde_json::from_value::<ItemChanges>(json!({"rate": 9.99, "color": "red"}))
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(changes.fields(), vec![ItemField::Rate(Money::from_cents(999))]);
        assert_eq!(changes.fields()[0].column(), "rate_cents");

        let empty: ItemChanges = serde_json::from_value(json!({"color": "red"})).unwrap();
        assert!(empty.is_empty());
        assert!(empty.fields().is_empty());
    }

    #[test]
    fn test_item_changes_rejects_bad_values() {
        let changes: ItemChanges = serde_json::from_value(json!({"name": "   "})).unwrap();
        assert!(changes.validate().is_err());

        let changes: ItemChanges = serde_json::from_value(json!({"rate": -1})).unwrap();
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_new_sale_valid() {
        let draft = sale(json!({
            "cashier_id": 1,
            "total_amount": 20.00,
            "items": [{"item_id": 5, "quantity": 2, "rate": 10.00, "subtotal": 20.00}]
        }))
        .unwrap();

        assert_eq!(draft.cashier_id, 1);
        assert_eq!(draft.total_amount, Money::from_cents(2000));
        assert_eq!(
            draft.lines,
            vec![SaleLineDraft {
                item_id: 5,
                quantity: 2.0,
                rate: Money::from_cents(1000),
                subtotal: Money::from_cents(2000),
            }]
        );
    }

    #[test]
    fn test_new_sale_missing_fields() {
        let err = sale(json!({"cashier_id": 1})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["total_amount".to_string(), "items".to_string()]
            }
        );
        assert_eq!(err.to_string(), "Missing data! Need total_amount, items");
    }

    #[test]
    fn test_new_sale_empty_items() {
        let err = sale(json!({"cashier_id": 1, "total_amount": 0, "items": []})).unwrap_err();
        assert_eq!(err, ValidationError::EmptySale);
    }

    #[test]
    fn test_new_sale_line_checks() {
        let err = sale(json!({
            "cashier_id": 1,
            "total_amount": 20.00,
            "items": [{"item_id": 5, "quantity": 0, "rate": 10.00, "subtotal": 0}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MustBePositive {
                field: "items[0].quantity".to_string()
            }
        );

        let err = sale(json!({
            "cashier_id": 1,
            "total_amount": 25.00,
            "items": [{"item_id": 5, "quantity": 2, "rate": 10.00, "subtotal": 25.00}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::SubtotalMismatch { line: 0, .. }));

        let err = sale(json!({
            "cashier_id": 1,
            "total_amount": 20.00,
            "items": [{"item_id": 5, "rate": 10.00}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec![
                    "items[0].quantity".to_string(),
                    "items[0].subtotal".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_new_sale_total_mismatch() {
        let err = sale(json!({
            "cashier_id": 1,
            "total_amount": 21.00,
            "items": [{"item_id": 5, "quantity": 2, "rate": 10.00, "subtotal": 20.00}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::TotalMismatch { .. }));
    }

    #[test]
    fn test_new_sale_fractional_quantity() {
        let draft = sale(json!({
            "cashier_id": 3,
            "total_amount": "68.99",
            "items": [{"item_id": 2, "quantity": 1.5, "rate": "45.99", "subtotal": "68.99"}]
        }))
        .unwrap();
        assert_eq!(draft.lines[0].quantity, 1.5);
    }

    #[test]
    fn test_new_sale_rejects_huge_amounts() {
        let body = json!({
            "cashier_id": 1,
            "total_amount": 1,
            "items": [{
                "item_id": 1,
                "quantity": 1,
                "rate": 90000000000000000u64,
                "subtotal": -90000000000000000i64
            }]
        });
        assert!(serde_json::from_value::<NewSale>(body).is_err());
    }

    #[test]
    fn test_new_sale_extreme_cents_fail_validation() {
        let line = |cents: i64, subtotal: i64| SaleLine {
            item_id: Some(1),
            quantity: Some(1.0),
            rate: Some(Money::from_cents(cents)),
            subtotal: Some(Money::from_cents(subtotal)),
        };

        let opposite = NewSale {
            cashier_id: Some(1),
            total_amount: Some(Money::from_cents(1)),
            items: Some(vec![line(9_000_000_000_000_000_000, -9_000_000_000_000_000_000)]),
        };
        assert!(matches!(
            opposite.validate(),
            Err(ValidationError::SubtotalMismatch { line: 0, .. })
        ));

        let big = 6_000_000_000_000_000_000;
        let overflowing = NewSale {
            cashier_id: Some(1),
            total_amount: Some(Money::from_cents(100)),
            items: Some(vec![line(big, big), line(big, big)]),
        };
        assert!(matches!(
            overflowing.validate(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
