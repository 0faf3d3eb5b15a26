//! # Domain Types
//!
//! Core domain types used throughout the store admin.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Bill       │   │    BillItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──┼──────────────── │───│  item_id (FK)   │       │
//! │  │  name           │   │  id (i64)       │◄──│  bill_id (FK)   │       │
//! │  │  rate           │   │  cashier_id     │   │  quantity (f64) │       │
//! │  │  unit           │   │  total_amount   │   │  rate           │       │
//! │  │  category       │   │  created_at     │   │  subtotal       │       │
//! │  │  image          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Unit       │   │   BillDetail    │   │  SalesSummary   │       │
//! │  │  pcs / kg /     │   │  Bill + lines   │   │  count, revenue │       │
//! │  │  pkt / l        │   │  with item name │   │  average        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rate Snapshot
//! A bill line copies the item's rate at the moment of sale. Editing the
//! catalog afterwards never changes recorded bills.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Unit
// =============================================================================

/// Unit of measure an item is sold in.
///
/// Stored as its short code (`pcs`, `kg`, `pkt`, `l`). The long spellings the
/// older dashboard used are still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Unit {
    /// Counted pieces.
    #[serde(rename = "pcs", alias = "piece", alias = "pieces")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pcs"))]
    Piece,
    /// Weighed in kilograms; quantities may be fractional.
    #[serde(rename = "kg")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "kg"))]
    Kilogram,
    #[serde(rename = "pkt", alias = "packet")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pkt"))]
    Packet,
    #[serde(rename = "l", alias = "liter", alias = "litre")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "l"))]
    Liter,
}

impl Unit {
    /// Returns the short code as stored in the database.
    pub const fn code(&self) -> &'static str {
        match self {
            Unit::Piece => "pcs",
            Unit::Kilogram => "kg",
            Unit::Packet => "pkt",
            Unit::Liter => "l",
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Piece
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name shown at the counter and on receipts.
    pub name: String,

    /// Price per unit.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "rate_cents"))]
    pub rate: Money,

    pub unit: Unit,

    pub category: String,

    /// Picture as a base64 data URL, if one was uploaded.
    pub image: Option<String>,

    /// Number of bill lines that reference this item.
    ///
    /// Items with a non-zero count cannot be deleted.
    pub usage_count: i64,
}

impl Item {
    /// Checks whether the item has an uploaded picture.
    #[inline]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A recorded sale (the bill header).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Bill {
    pub id: i64,

    /// Cashier who rang up the sale.
    pub cashier_id: i64,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    pub total_amount: Money,

    /// When the sale was recorded (assigned by the server).
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Bill Item
// =============================================================================

/// One line of a recorded bill.
///
/// `rate` and `subtotal` are snapshots taken at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BillItem {
    pub id: i64,
    pub bill_id: i64,
    pub item_id: i64,
    pub quantity: f64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "rate_cents"))]
    pub rate: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    pub subtotal: Money,
}

/// A bill line joined with the catalog entry it refers to.
///
/// This is what receipts print: the item's current name and unit next to
/// the quantity and the rate charged at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BillDetailItem {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub unit: Unit,
    pub quantity: f64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "rate_cents"))]
    pub rate: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    pub subtotal: Money,
}

/// A bill header together with all of its lines.
///
/// Serializes flat: the header fields sit next to an `items` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillDetail {
    #[serde(flatten)]
    pub bill: Bill,
    pub items: Vec<BillDetailItem>,
}

impl BillDetail {
    /// Sum of the line subtotals as stored.
    pub fn lines_total(&self) -> Money {
        self.items.iter().map(|line| line.subtotal).sum()
    }
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Aggregate figures over every recorded bill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub bill_count: i64,
    pub total_revenue: Money,
    pub average_bill: Money,
}

impl SalesSummary {
    /// Builds a summary from a bill count and revenue.
    ///
    /// The average is zero when there are no bills.
    pub fn new(bill_count: i64, total_revenue: Money) -> Self {
        SalesSummary {
            bill_count,
            total_revenue,
            average_bill: total_revenue.divide(bill_count),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_codes_and_aliases() {
        let unit: Unit = serde_json::from_str("\"kg\"").unwrap();
        assert_eq!(unit, Unit::Kilogram);

        let unit: Unit = serde_json::from_str("\"litre\"").unwrap();
        assert_eq!(unit, Unit::Liter);

        let unit: Unit = serde_json::from_str("\"piece\"").unwrap();
        assert_eq!(unit, Unit::Piece);

        assert!(serde_json::from_str::<Unit>("\"dozen\"").is_err());
        assert_eq!(serde_json::to_string(&Unit::Packet).unwrap(), "\"pkt\"");
        assert_eq!(Unit::default(), Unit::Piece);
    }

    #[test]
    fn test_bill_detail_serializes_flat() {
        let detail = BillDetail {
            bill: Bill {
                id: 7,
                cashier_id: 2,
                total_amount: Money::from_cents(2000),
                created_at: Utc::now(),
            },
            items: vec![BillDetailItem {
                id: 1,
                item_id: 5,
                name: "Rice".to_string(),
                unit: Unit::Kilogram,
                quantity: 2.0,
                rate: Money::from_cents(1000),
                subtotal: Money::from_cents(2000),
            }],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["cashier_id"], 2);
        assert_eq!(json["total_amount"], 20.0);
        assert_eq!(json["items"][0]["name"], "Rice");
        assert_eq!(json["items"][0]["unit"], "kg");
        assert_eq!(detail.lines_total(), Money::from_cents(2000));
    }

    #[test]
    fn test_sales_summary_average() {
        let summary = SalesSummary::new(4, Money::from_cents(10000));
        assert_eq!(summary.average_bill, Money::from_cents(2500));

        let empty = SalesSummary::new(0, Money::zero());
        assert_eq!(empty.average_bill, Money::zero());
    }
}
