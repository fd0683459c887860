//! # SQLite Inventory Store
//!
//! `InventoryStore` backed by the local database.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    ├── look up item by name                                            │
//! │    ├── Issue:      UPDATE ... quantity - q WHERE quantity >= q          │
//! │    ├── Receive:    UPDATE ... quantity + q   (or INSERT new item)       │
//! │    ├── Adjustment: UPDATE ... quantity = q                              │
//! │    └── INSERT INTO transactions                                        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the SQL transaction: nothing is kept.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use stockroom_core::{
    CommitReceipt, Item, Quantity, Transaction, TransactionDraft, TransactionType,
};
use stockroom_engine::{InventoryStore, RemoteFailure, StoreResult};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{item, transaction};

/// Inventory store over a [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn commit_movement(&self, draft: &TransactionDraft) -> DbResult<CommitReceipt> {
        let mut tx = self.db.pool().begin().await?;

        let existing = item::find_by_name(&mut tx, &draft.item_name).await?;
        let item_id = match (draft.kind, existing) {
            (TransactionType::Issue, Some(found)) => {
                if !item::take(&mut tx, &found.id, draft.quantity).await? {
                    return Err(DbError::MovementRejected(format!(
                        "only {} {} of {} on hand, requested {}",
                        found.quantity, found.unit, found.name, draft.quantity
                    )));
                }
                found.id
            }
            (TransactionType::Issue, None) => {
                return Err(DbError::MovementRejected(format!(
                    "unknown item '{}'",
                    draft.item_name
                )))
            }
            (TransactionType::Receive, Some(found)) => {
                if !item::put(&mut tx, &found.id, draft.quantity).await? {
                    return Err(DbError::MovementRejected(format!(
                        "{} {} of {} on hand, receiving {} would pass the limit of {}",
                        found.quantity,
                        found.unit,
                        found.name,
                        draft.quantity,
                        Quantity::MAX
                    )));
                }
                found.id
            }
            (TransactionType::Receive, None) => {
                if !draft.quantity.is_within_max() {
                    return Err(DbError::MovementRejected(format!(
                        "receiving {} would pass the limit of {}",
                        draft.quantity,
                        Quantity::MAX
                    )));
                }
                let created = Item {
                    id: Uuid::new_v4().to_string(),
                    name: draft.item_name.clone(),
                    category: draft.category_hint.unwrap_or_default(),
                    quantity: draft.quantity,
                    unit: draft.unit.clone(),
                    min_level: Quantity::zero(),
                };
                item::insert(&mut tx, &created).await?;
                debug!(id = %created.id, name = %created.name, "Receive onboarded new item");
                created.id
            }
            (TransactionType::Adjustment, _) => {
                return Err(DbError::MovementRejected(
                    "adjustments go through update_inventory_quantity".into(),
                ))
            }
        };

        let receipt = new_receipt(item_id);
        transaction::insert(&mut tx, &Transaction::from_draft(draft, &receipt), &receipt.item_id)
            .await?;

        tx.commit().await?;
        Ok(receipt)
    }

    async fn commit_adjustment(&self, draft: &TransactionDraft) -> DbResult<CommitReceipt> {
        if draft.kind != TransactionType::Adjustment {
            return Err(DbError::MovementRejected(
                "quantity updates must be adjustments".into(),
            ));
        }

        if draft.quantity.is_negative() || !draft.quantity.is_within_max() {
            return Err(DbError::MovementRejected(format!(
                "level {} is outside 0..={}",
                draft.quantity,
                Quantity::MAX
            )));
        }

        let mut tx = self.db.pool().begin().await?;

        let found = item::find_by_name(&mut tx, &draft.item_name)
            .await?
            .ok_or_else(|| DbError::not_found("Item", draft.item_name.clone()))?;
        item::set_quantity(&mut tx, &found.id, draft.quantity).await?;

        let receipt = new_receipt(found.id);
        transaction::insert(&mut tx, &Transaction::from_draft(draft, &receipt), &receipt.item_id)
            .await?;

        tx.commit().await?;
        Ok(receipt)
    }
}

fn new_receipt(item_id: String) -> CommitReceipt {
    CommitReceipt {
        transaction_id: Uuid::new_v4().to_string(),
        recorded_at: Utc::now(),
        item_id,
    }
}

fn to_remote(operation: &'static str) -> impl Fn(DbError) -> RemoteFailure {
    move |err| {
        warn!(operation, error = %err, "Database store call failed");
        RemoteFailure::from(err)
    }
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn fetch_inventory(&self) -> StoreResult<Vec<Item>> {
        self.db.items().list().await.map_err(to_remote("fetch_inventory"))
    }

    async fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>> {
        self.db
            .transactions()
            .list()
            .await
            .map_err(to_remote("fetch_transactions"))
    }

    async fn submit_transaction(&self, draft: &TransactionDraft) -> StoreResult<CommitReceipt> {
        self.commit_movement(draft)
            .await
            .map_err(to_remote("submit_transaction"))
    }

    async fn update_inventory_quantity(
        &self,
        draft: &TransactionDraft,
    ) -> StoreResult<CommitReceipt> {
        self.commit_adjustment(draft)
            .await
            .map_err(to_remote("update_inventory_quantity"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
