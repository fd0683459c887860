//! # Item Repository
//!
//! Database operations for the `items` table (the Catalog).
//!
//! Reads go through [`ItemRepository`] on the pool. Writes that must land
//! together with a Ledger row take a `&mut SqliteConnection` borrowed from
//! an open SQL transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Item, Quantity};

const SELECT_ITEMS: &str = "SELECT id, name, category, quantity, unit, min_level FROM items";

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
/// let items = repo.list().await?;
/// let soap = repo.get_by_name("Hand Soap").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists all items in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Loaded items");
        Ok(items)
    }

    /// Gets an item by its exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} WHERE name = ?1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Gets an item by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Inserts a new item.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the name or id is taken
    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, item).await
    }

    /// Number of items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level operations
// =============================================================================

/// Finds an item by name on an open connection.
pub(crate) async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} WHERE name = ?1"))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Inserts an item on an open connection.
pub(crate) async fn insert(conn: &mut SqliteConnection, item: &Item) -> DbResult<()> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO items (id, name, category, quantity, unit, min_level, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(item.category)
    .bind(item.quantity)
    .bind(&item.unit)
    .bind(item.min_level)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, item.name.clone()),
        other => other,
    })?;

    debug!(id = %item.id, name = %item.name, "Inserted item");
    Ok(())
}

/// Removes `amount` from an item, only if that much is on hand.
///
/// Returns false when the item holds less than `amount`.
pub(crate) async fn take(conn: &mut SqliteConnection, id: &str, amount: Quantity) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adds `amount` to an item unless the level would pass `Quantity::MAX`.
///
/// Returns false, changing nothing, when the guard fails.
pub(crate) async fn put(conn: &mut SqliteConnection, id: &str, amount: Quantity) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE id = ?1 AND quantity <= ?4 - ?2
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .bind(Quantity::MAX)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Sets an item's quantity to an absolute level.
pub(crate) async fn set_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: Quantity,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE items SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Item", id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::Category;

    fn soap() -> Item {
        Item {
            id: "i-1".into(),
            name: "Hand Soap".into(),
            category: Category::Housekeeping,
            quantity: Quantity::from_units(10),
            unit: "bottles".into(),
            min_level: Quantity::from_units(3),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        repo.insert(&soap()).await.unwrap();

        assert_eq!(repo.get_by_name("Hand Soap").await.unwrap(), Some(soap()));
        assert_eq!(repo.get_by_id("i-1").await.unwrap(), Some(soap()));
        assert_eq!(repo.get_by_name("hand soap").await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();
        repo.insert(&soap()).await.unwrap();

        let mut again = soap();
        again.id = "i-2".into();
        let err = repo.insert(&again).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "Hand Soap"));
    }

    #[tokio::test]
    async fn test_take_never_goes_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items().insert(&soap()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(!take(&mut conn, "i-1", Quantity::from_units(11)).await.unwrap());
        assert!(take(&mut conn, "i-1", Quantity::from_units(10)).await.unwrap());
        drop(conn);

        let item = db.items().get_by_id("i-1").await.unwrap().unwrap();
        assert!(item.quantity.is_zero());
    }

    #[tokio::test]
    async fn test_negative_level_hits_check_constraint() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items().insert(&soap()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = set_quantity(&mut conn, "i-1", Quantity::from_units(-1))
            .await
            .unwrap_err();
        assert!(err.is_constraint());
    }
}
