//! # Item Repository
//!
//! The catalog store: database operations for sellable items.
//!
//! ## Usage Count
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items                          bill_items                              │
//! │  ┌────┬────────┬──────┐         ┌────┬─────────┬─────────┐             │
//! │  │ id │ name   │ rate │         │ id │ bill_id │ item_id │             │
//! │  ├────┼────────┼──────┤         ├────┼─────────┼─────────┤             │
//! │  │  1 │ Sugar  │ 4500 │◄────────│  1 │    1    │    1    │             │
//! │  │  2 │ Salt   │ 2000 │         │  2 │    2    │    1    │             │
//! │  └────┴────────┴──────┘         └────┴─────────┴─────────┘             │
//! │                                                                         │
//! │  usage_count(Sugar) = 2  → delete refused (ItemInUse)                  │
//! │  usage_count(Salt)  = 0  → delete allowed                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The count is derived on every read, never stored.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, timestamp_now};
use store_core::error::check_deletable;
use store_core::{Item, ItemChanges, ItemDraft, ItemField};

/// Item columns plus the derived usage count.
const SELECT_ITEMS: &str = r#"
    SELECT
        i.id,
        i.name,
        i.rate_cents,
        i.unit,
        i.category,
        i.image,
        (SELECT COUNT(*) FROM bill_items bi WHERE bi.item_id = i.id) AS usage_count
    FROM items i
"#;

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists catalog items ordered by name.
    ///
    /// ## Arguments
    /// * `search` - Optional case-insensitive substring of the item name
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Item>> {
        debug!(search = ?search, "Listing items");

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_ITEMS);

        if let Some(term) = search {
            query
                .push(" WHERE i.name LIKE ")
                .push_bind(like_pattern(term))
                .push(r" ESCAPE '\'");
        }

        query.push(" ORDER BY i.name COLLATE NOCASE, i.id");

        let items = query.build_query_as::<Item>().fetch_all(&self.pool).await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Gets an item by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} WHERE i.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Inserts a new item.
    ///
    /// ## Returns
    /// The server-assigned item id.
    pub async fn insert(&self, item: &ItemDraft) -> DbResult<i64> {
        debug!(name = %item.name, rate = %item.rate, "Inserting item");

        let now = timestamp_now();

        let result = sqlx::query(
            r#"
            INSERT INTO items (name, rate_cents, unit, category, image, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&item.name)
        .bind(item.rate)
        .bind(item.unit)
        .bind(&item.category)
        .bind(&item.image)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, name = %item.name, "Item added");
        Ok(id)
    }

    /// Applies a partial update.
    ///
    /// Only the fields present in `changes` appear in the generated
    /// statement, each as a bound parameter:
    ///
    /// ```text
    /// {"rate": 9.99}  →  UPDATE items SET rate_cents = ?, updated_at = ? WHERE id = ?
    /// ```
    ///
    /// ## Returns
    /// * `Ok(false)` - Nothing to change; the database was not touched
    /// * `Ok(true)` - Row updated
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    pub async fn update(&self, id: i64, changes: &ItemChanges) -> DbResult<bool> {
        let fields = changes.fields();

        if fields.is_empty() {
            debug!(id, "No item fields to update");
            return Ok(false);
        }

        debug!(
            id,
            columns = ?fields.iter().map(ItemField::column).collect::<Vec<_>>(),
            "Updating item"
        );

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
        let mut assignments = query.separated(", ");

        for field in fields {
            assignments.push(format_args!("{} = ", field.column()));
            match field {
                ItemField::Name(value) | ItemField::Category(value) => {
                    assignments.push_bind_unseparated(value)
                }
                ItemField::Rate(rate) => assignments.push_bind_unseparated(rate),
                ItemField::Unit(unit) => assignments.push_bind_unseparated(unit),
                ItemField::Image(image) => assignments.push_bind_unseparated(image),
            };
        }

        assignments
            .push("updated_at = ")
            .push_bind_unseparated(timestamp_now());

        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        info!(id, "Item updated");
        Ok(true)
    }

    /// Deletes an item that no bill line references.
    ///
    /// The usage check and the delete share one transaction, so a sale
    /// recorded in between cannot slip past the check.
    ///
    /// ## Returns
    /// * `Ok(())` - Item removed
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    /// * `Err(DbError::Rule(CoreError::ItemInUse))` - Item has been sold
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting item");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let usage_count: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM bill_items bi WHERE bi.item_id = i.id)
            FROM items i
            WHERE i.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let usage_count = usage_count.ok_or_else(|| DbError::not_found("Item", id))?;
        check_deletable(id, usage_count)?;

        sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id, "Item deleted");
        Ok(())
    }

    /// Counts catalog items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use store_core::{CoreError, Money, NewSale, SaleLine, Unit};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn draft(name: &str, cents: i64) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            rate: Money::from_cents(cents),
            unit: Unit::Piece,
            category: "General".to_string(),
            image: None,
        }
    }

    async fn sell(db: &Database, item_id: i64, cents: i64) -> i64 {
        let sale = NewSale {
            cashier_id: Some(1),
            total_amount: Some(Money::from_cents(cents)),
            items: Some(vec![SaleLine {
                item_id: Some(item_id),
                quantity: Some(1.0),
                rate: Some(Money::from_cents(cents)),
                subtotal: Some(Money::from_cents(cents)),
            }]),
        }
        .validate()
        .unwrap();

        db.bills().record_sale(&sale).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.items();

        let mut rice = draft("Basmati Rice", 12050);
        rice.unit = Unit::Kilogram;
        rice.category = "Grains".to_string();
        rice.image = Some("data:image/jpeg;base64,AAAA".to_string());

        let id = repo.insert(&rice).await.unwrap();
        let item = repo.get_by_id(id).await.unwrap().unwrap();

        assert_eq!(item.name, "Basmati Rice");
        assert_eq!(item.rate, Money::from_cents(12050));
        assert_eq!(item.unit, Unit::Kilogram);
        assert_eq!(item.category, "Grains");
        assert!(item.has_image());
        assert_eq!(item.usage_count, 0);

        assert!(repo.get_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let db = setup().await;
        let a = db.items().insert(&draft("A", 100)).await.unwrap();
        let b = db.items().insert(&draft("B", 100)).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(db.items().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_search_and_order() {
        let db = setup().await;
        let repo = db.items();
        repo.insert(&draft("sugar", 4500)).await.unwrap();
        repo.insert(&draft("Brown Sugar", 6000)).await.unwrap();
        repo.insert(&draft("Salt", 2000)).await.unwrap();
        repo.insert(&draft("100% Juice", 9000)).await.unwrap();

        let all = repo.list(None).await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["100% Juice", "Brown Sugar", "Salt", "sugar"]);

        let sugars = repo.list(Some("SUGAR")).await.unwrap();
        assert_eq!(sugars.len(), 2);

        let percent = repo.list(Some("%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% Juice");
    }

    #[tokio::test]
    async fn test_update_changes_only_rate() {
        let db = setup().await;
        let repo = db.items();

        let mut milk = draft("Milk", 5500);
        milk.unit = Unit::Liter;
        milk.category = "Dairy".to_string();
        milk.image = Some("data:image/png;base64,BBBB".to_string());
        let id = repo.insert(&milk).await.unwrap();
        let before = repo.get_by_id(id).await.unwrap().unwrap();

        let changes = ItemChanges {
            rate: Some(Money::from_cents(999)),
            ..Default::default()
        };
        assert!(repo.update(id, &changes).await.unwrap());

        let after = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.rate, Money::from_cents(999));
        assert_eq!(
            Item {
                rate: before.rate,
                ..after
            },
            before
        );
    }

    #[tokio::test]
    async fn test_update_clears_image() {
        let db = setup().await;
        let repo = db.items();

        let mut tea = draft("Tea", 25000);
        tea.image = Some("data:image/png;base64,CCCC".to_string());
        let id = repo.insert(&tea).await.unwrap();

        let changes = ItemChanges {
            image: Some(None),
            ..Default::default()
        };
        repo.update(id, &changes).await.unwrap();

        let item = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(item.image, None);
        assert_eq!(item.name, "Tea");
    }

    #[tokio::test]
    async fn test_update_empty_and_missing() {
        let db = setup().await;
        let repo = db.items();

        assert!(!repo.update(999, &ItemChanges::default()).await.unwrap());

        let changes = ItemChanges {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        let err = repo.update(999, &changes).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_item() {
        let db = setup().await;
        let repo = db.items();
        let id = repo.insert(&draft("Soap", 3000)).await.unwrap();

        repo.delete(id).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_referenced_item_is_refused() {
        let db = setup().await;
        let repo = db.items();
        let id = repo.insert(&draft("Bread", 4000)).await.unwrap();
        sell(&db, id, 4000).await;
        sell(&db, id, 4000).await;

        let before = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(before.usage_count, 2);

        let err = repo.delete(id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::ItemInUse { usage_count: 2, .. })
        ));

        let after = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let db = setup().await;

        let err = db.items().delete(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
