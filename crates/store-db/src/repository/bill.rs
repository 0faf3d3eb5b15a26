//! # Bill Repository
//!
//! Records sales and reads them back.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale(draft)                                │
//! │                                                                         │
//! │  pool.begin()  ── borrows ONE connection for the whole write           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO bills (...)            → bill_id                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO bill_items (...) VALUES (bill_id, ...), (bill_id, ...)    │
//! │       │                                                                 │
//! │       ├── any error ──► ROLLBACK ──► nothing persisted, error returned │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► connection back to the pool                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nobody ever sees a bill without its lines or a line without its bill.
//! Items are only referenced, never modified.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, timestamp_now};
use store_core::{Bill, BillDetail, BillDetailItem, BillItem, Money, SaleDraft, SalesSummary};

/// Repository for bill (sale) operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a validated sale as one bill with its lines.
    ///
    /// ## Returns
    /// * `Ok(bill_id)` - Header and every line committed
    /// * `Err(DbError::ForeignKeyViolation)` - A line references an unknown item
    /// * `Err(_)` - Any other failure; the transaction was rolled back
    pub async fn record_sale(&self, sale: &SaleDraft) -> DbResult<i64> {
        debug!(
            cashier_id = sale.cashier_id,
            lines = sale.lines.len(),
            total = %sale.total_amount,
            "Recording sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match insert_bill(&mut tx, sale).await {
            Ok(bill_id) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    bill_id,
                    cashier_id = sale.cashier_id,
                    total = %sale.total_amount,
                    "Sale recorded"
                );
                Ok(bill_id)
            }
            Err(err) => {
                warn!(error = %err, "Recording sale failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists bill headers, newest first.
    ///
    /// ## Arguments
    /// * `search` - Optional substring of the bill id or the cashier id
    /// * `limit` / `offset` - Page window
    pub async fn list(&self, search: Option<&str>, limit: u32, offset: u32) -> DbResult<Vec<Bill>> {
        debug!(search = ?search, limit, offset, "Listing bills");

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, cashier_id, total_cents, created_at FROM bills",
        );

        if let Some(term) = search {
            let pattern = like_pattern(term);
            query
                .push(" WHERE CAST(id AS TEXT) LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR CAST(cashier_id AS TEXT) LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\'");
        }

        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let bills = query.build_query_as::<Bill>().fetch_all(&self.pool).await?;

        debug!(count = bills.len(), "Listed bills");
        Ok(bills)
    }

    /// Gets a bill header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(
            "SELECT id, cashier_id, total_cents, created_at FROM bills WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// Gets the stored lines of a bill, exactly as recorded.
    pub async fn get_lines(&self, bill_id: i64) -> DbResult<Vec<BillItem>> {
        let lines = sqlx::query_as::<_, BillItem>(
            r#"
            SELECT id, bill_id, item_id, quantity, rate_cents, subtotal_cents
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY id
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets a bill with its lines, each joined with the item's current
    /// name and unit.
    ///
    /// Quantity, rate and subtotal come from the bill line, so later
    /// price changes in the catalog don't show up here.
    ///
    /// ## Returns
    /// * `Ok(None)` - No bill with this id
    pub async fn get_detail(&self, id: i64) -> DbResult<Option<BillDetail>> {
        debug!(id, "Loading bill detail");

        let Some(bill) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, BillDetailItem>(
            r#"
            SELECT
                bi.id,
                bi.item_id,
                i.name,
                i.unit,
                bi.quantity,
                bi.rate_cents,
                bi.subtotal_cents
            FROM bill_items bi
            INNER JOIN items i ON i.id = bi.item_id
            WHERE bi.bill_id = ?1
            ORDER BY bi.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(BillDetail { bill, items }))
    }

    /// Counts bills and sums their totals.
    pub async fn summary(&self) -> DbResult<SalesSummary> {
        let (count, revenue): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM bills")
                .fetch_one(&self.pool)
                .await?;

        Ok(SalesSummary::new(count, Money::from_cents(revenue)))
    }
}

/// Header and lines, on the transaction's connection.
async fn insert_bill(conn: &mut SqliteConnection, sale: &SaleDraft) -> DbResult<i64> {
    let bill_id = sqlx::query(
        "INSERT INTO bills (cashier_id, total_cents, created_at) VALUES (?1, ?2, ?3)",
    )
    .bind(sale.cashier_id)
    .bind(sale.total_amount)
    .bind(timestamp_now())
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    let mut lines = QueryBuilder::<Sqlite>::new(
        "INSERT INTO bill_items (bill_id, item_id, quantity, rate_cents, subtotal_cents) ",
    );
    lines.push_values(&sale.lines, |mut row, line| {
        row.push_bind(bill_id)
            .push_bind(line.item_id)
            .push_bind(line.quantity)
            .push_bind(line.rate)
            .push_bind(line.subtotal);
    });
    lines.build().execute(&mut *conn).await?;

    Ok(bill_id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use store_core::{ItemChanges, ItemDraft, NewSale, SaleLineDraft, Unit};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_item(db: &Database, name: &str, cents: i64, unit: Unit) -> i64 {
        db.items()
            .insert(&ItemDraft {
                name: name.to_string(),
                rate: Money::from_cents(cents),
                unit,
                category: "General".to_string(),
                image: None,
            })
            .await
            .unwrap()
    }

    fn one_line_sale(cashier_id: i64, item_id: i64, quantity: f64, rate_cents: i64) -> SaleDraft {
        let rate = Money::from_cents(rate_cents);
        let subtotal = rate.multiply_quantity(quantity);
        SaleDraft {
            cashier_id,
            total_amount: subtotal,
            lines: vec![SaleLineDraft {
                item_id,
                quantity,
                rate,
                subtotal,
            }],
        }
    }

    async fn bill_rows(db: &Database) -> (i64, i64) {
        sqlx::query_as("SELECT (SELECT COUNT(*) FROM bills), (SELECT COUNT(*) FROM bill_items)")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_sale_then_detail() {
        let db = setup().await;
        for n in 1..=5 {
            add_item(&db, &format!("Item {n}"), 1000, Unit::Piece).await;
        }

        let sale = one_line_sale(1, 5, 2.0, 1000);
        let bill_id = db.bills().record_sale(&sale).await.unwrap();

        let detail = db.bills().get_detail(bill_id).await.unwrap().unwrap();
        assert_eq!(detail.bill.id, bill_id);
        assert_eq!(detail.bill.cashier_id, 1);
        assert_eq!(detail.bill.total_amount, Money::from_cents(2000));
        assert_eq!(detail.items.len(), 1);

        let line = &detail.items[0];
        assert_eq!(line.item_id, 5);
        assert_eq!(line.name, "Item 5");
        assert_eq!(line.unit, Unit::Piece);
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.rate, Money::from_cents(1000));
        assert_eq!(line.subtotal, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn test_detail_ignores_later_price_changes() {
        let db = setup().await;
        let flour = add_item(&db, "Flour", 4599, Unit::Kilogram).await;

        let sale = one_line_sale(2, flour, 1.5, 4599);
        let bill_id = db.bills().record_sale(&sale).await.unwrap();

        let changes = ItemChanges {
            rate: Some(Money::from_cents(9900)),
            ..Default::default()
        };
        db.items().update(flour, &changes).await.unwrap();

        let detail = db.bills().get_detail(bill_id).await.unwrap().unwrap();
        assert_eq!(detail.items[0].rate, Money::from_cents(4599));
        assert_eq!(detail.items[0].subtotal, Money::from_cents(6899));
        assert_eq!(detail.items[0].quantity, 1.5);

        let stored = db.bills().get_lines(bill_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].bill_id, bill_id);
        assert_eq!(stored[0].rate, sale.lines[0].rate);
        assert_eq!(stored[0].subtotal, sale.lines[0].subtotal);
    }

    #[tokio::test]
    async fn test_failed_line_insert_leaves_no_header() {
        let db = setup().await;
        let tea = add_item(&db, "Tea", 25000, Unit::Packet).await;

        let mut sale = one_line_sale(1, tea, 1.0, 25000);
        sale.lines.push(SaleLineDraft {
            item_id: 9999,
            quantity: 1.0,
            rate: Money::from_cents(100),
            subtotal: Money::from_cents(100),
        });
        sale.total_amount = Money::from_cents(25100);

        let err = db.bills().record_sale(&sale).await.unwrap_err();
        assert!(err.is_foreign_key_violation());

        assert_eq!(bill_rows(&db).await, (0, 0));
        assert!(db.bills().list(None, 100, 0).await.unwrap().is_empty());

        // the pool is still usable after the rollback
        let ok = db.bills().record_sale(&one_line_sale(1, tea, 1.0, 25000)).await;
        assert!(ok.is_ok());
        assert_eq!(bill_rows(&db).await, (1, 1));
    }

    #[tokio::test]
    async fn test_empty_sale_writes_nothing() {
        let db = setup().await;

        let err = NewSale {
            cashier_id: Some(1),
            total_amount: Some(Money::from_cents(2000)),
            items: Some(vec![]),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, store_core::ValidationError::EmptySale);

        assert_eq!(bill_rows(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_bulk_lines_share_bill_id() {
        let db = setup().await;
        let a = add_item(&db, "Apples", 12000, Unit::Kilogram).await;
        let b = add_item(&db, "Bananas", 6000, Unit::Piece).await;

        let lines = vec![
            SaleLineDraft {
                item_id: a,
                quantity: 0.5,
                rate: Money::from_cents(12000),
                subtotal: Money::from_cents(6000),
            },
            SaleLineDraft {
                item_id: b,
                quantity: 12.0,
                rate: Money::from_cents(6000),
                subtotal: Money::from_cents(72000),
            },
        ];
        let sale = SaleDraft {
            cashier_id: 4,
            total_amount: Money::from_cents(78000),
            lines,
        };

        let bill_id = db.bills().record_sale(&sale).await.unwrap();

        let detail = db.bills().get_detail(bill_id).await.unwrap().unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].name, "Apples");
        assert_eq!(detail.items[1].name, "Bananas");
        assert_eq!(detail.lines_total(), detail.bill.total_amount);
        assert_eq!(bill_rows(&db).await, (1, 2));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = setup().await;
        let soap = add_item(&db, "Soap", 3000, Unit::Piece).await;

        // An old bill with a high id must still sort last
        sqlx::query(
            "INSERT INTO bills (id, cashier_id, total_cents, created_at) \
             VALUES (500, 9, 3000, '2020-01-01T00:00:00.000000Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let first = db.bills().record_sale(&one_line_sale(1, soap, 1.0, 3000)).await.unwrap();
        let second = db.bills().record_sale(&one_line_sale(2, soap, 1.0, 3000)).await.unwrap();

        let bills = db.bills().list(None, 100, 0).await.unwrap();
        let ids: Vec<i64> = bills.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second, first, 500]);

        for pair in bills.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let page = db.bills().list(None, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, first);
    }

    #[tokio::test]
    async fn test_list_search_by_bill_or_cashier() {
        let db = setup().await;
        let soap = add_item(&db, "Soap", 3000, Unit::Piece).await;

        let by_seven = db.bills().record_sale(&one_line_sale(7, soap, 1.0, 3000)).await.unwrap();
        db.bills().record_sale(&one_line_sale(3, soap, 1.0, 3000)).await.unwrap();

        let found = db.bills().list(Some("7"), 100, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, by_seven);

        let none = db.bills().list(Some("x"), 100, 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_missing_bill_detail() {
        let db = setup().await;

        assert!(db.bills().get_detail(12345).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_summary() {
        let db = setup().await;

        let empty = db.bills().summary().await.unwrap();
        assert_eq!(empty.bill_count, 0);
        assert_eq!(empty.total_revenue, Money::zero());
        assert_eq!(empty.average_bill, Money::zero());

        let rice = add_item(&db, "Rice", 1000, Unit::Kilogram).await;
        db.bills().record_sale(&one_line_sale(1, rice, 1.0, 1000)).await.unwrap();
        db.bills().record_sale(&one_line_sale(1, rice, 2.0, 1000)).await.unwrap();

        let summary = db.bills().summary().await.unwrap();
        assert_eq!(summary.bill_count, 2);
        assert_eq!(summary.total_revenue, Money::from_cents(3000));
        assert_eq!(summary.average_bill, Money::from_cents(1500));
    }
}
