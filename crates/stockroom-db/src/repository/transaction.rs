//! # Transaction Repository
//!
//! Database operations for the `transactions` table (the Ledger).
//!
//! Rows are append-only. `recorded_at` is read back as the Transaction's
//! `date`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::Transaction;

const SELECT_TRANSACTIONS: &str = r#"
    SELECT id, kind, item_name, quantity, unit, location, person_name, notes,
           previous_quantity, recorded_at AS date
    FROM transactions
"#;

/// Repository for Ledger reads.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists every transaction, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let txs = sqlx::query_as::<_, Transaction>(&format!(
            "{SELECT_TRANSACTIONS} ORDER BY recorded_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = txs.len(), "Loaded transactions");
        Ok(txs)
    }

    /// Lists the transactions of one item, oldest first.
    pub async fn list_for_item(&self, item_name: &str) -> DbResult<Vec<Transaction>> {
        let txs = sqlx::query_as::<_, Transaction>(&format!(
            "{SELECT_TRANSACTIONS} WHERE item_name = ?1 ORDER BY recorded_at, rowid"
        ))
        .bind(item_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    /// Gets a transaction by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!("{SELECT_TRANSACTIONS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tx)
    }

    /// Number of transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Appends a Ledger row on an open connection.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    tx: &Transaction,
    item_id: &str,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, kind, item_id, item_name, quantity, unit, location,
            person_name, notes, previous_quantity, recorded_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&tx.id)
    .bind(tx.kind)
    .bind(item_id)
    .bind(&tx.item_name)
    .bind(tx.quantity)
    .bind(&tx.unit)
    .bind(tx.location)
    .bind(&tx.person_name)
    .bind(&tx.notes)
    .bind(tx.previous_quantity)
    .bind(tx.date)
    .execute(&mut *conn)
    .await?;

    debug!(id = %tx.id, kind = %tx.kind, item = %tx.item_name, "Appended transaction");
    Ok(())
}
