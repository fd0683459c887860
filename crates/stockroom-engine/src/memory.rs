//! # In-Memory Inventory Store
//!
//! A process-local `InventoryStore`, selected with the `memory://` endpoint.
//! Nothing survives the process. Tests use it to script store failures.

use async_trait::async_trait;
use chrono::Utc;
use stockroom_core::{
    CommitReceipt, Item, Quantity, Transaction, TransactionDraft, TransactionType,
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::store::{InventoryStore, RemoteFailure, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    transactions: Vec<Transaction>,
    /// Failure returned by the next mutating call, then cleared.
    pending_failure: Option<RemoteFailure>,
}

/// In-process store with the same commit rules as the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates a store preloaded with items and history.
    pub fn with_data(items: Vec<Item>, transactions: Vec<Transaction>) -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState {
                items,
                transactions,
                pending_failure: None,
            }),
        }
    }

    /// Makes the next submit/update call fail without committing.
    pub async fn fail_next(&self, failure: RemoteFailure) {
        self.state.lock().await.pending_failure = Some(failure);
    }

    /// Overwrites an item's level directly, bypassing the Ledger.
    ///
    /// Stands in for another client writing to the same store.
    pub async fn force_quantity(&self, name: &str, quantity: Quantity) -> bool {
        let mut state = self.state.lock().await;
        match state.items.iter_mut().find(|i| i.name == name) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }
}

fn receipt(item_id: String) -> CommitReceipt {
    CommitReceipt {
        transaction_id: Uuid::new_v4().to_string(),
        recorded_at: Utc::now(),
        item_id,
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn fetch_inventory(&self) -> StoreResult<Vec<Item>> {
        Ok(self.state.lock().await.items.clone())
    }

    async fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.state.lock().await.transactions.clone())
    }

    async fn submit_transaction(&self, draft: &TransactionDraft) -> StoreResult<CommitReceipt> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.pending_failure.take() {
            return Err(failure);
        }

        let position = state.items.iter().position(|i| i.name == draft.item_name);
        let item_id = match (draft.kind, position) {
            (TransactionType::Issue, Some(pos)) => {
                let item = &mut state.items[pos];
                if draft.quantity > item.quantity {
                    return Err(RemoteFailure::new("quantity would go negative"));
                }
                item.quantity -= draft.quantity;
                item.id.clone()
            }
            (TransactionType::Receive, Some(pos)) => {
                let item = &mut state.items[pos];
                item.quantity = item
                    .quantity
                    .checked_stock_add(draft.quantity)
                    .ok_or_else(|| RemoteFailure::new("quantity would exceed the maximum"))?;
                item.id.clone()
            }
            (TransactionType::Receive, None) => {
                if !draft.quantity.is_within_max() {
                    return Err(RemoteFailure::new("quantity would exceed the maximum"));
                }
                let id = Uuid::new_v4().to_string();
                state.items.push(Item {
                    id: id.clone(),
                    name: draft.item_name.clone(),
                    category: draft.category_hint.unwrap_or_default(),
                    quantity: draft.quantity,
                    unit: draft.unit.clone(),
                    min_level: Quantity::zero(),
                });
                id
            }
            (TransactionType::Issue, None) => {
                return Err(RemoteFailure::new(format!(
                    "unknown item '{}'",
                    draft.item_name
                )))
            }
            (TransactionType::Adjustment, _) => {
                return Err(RemoteFailure::new(
                    "adjustments go through update_inventory_quantity",
                ))
            }
        };

        let receipt = receipt(item_id);
        state
            .transactions
            .push(Transaction::from_draft(draft, &receipt));
        debug!(transaction_id = %receipt.transaction_id, "Memory store committed transaction");
        Ok(receipt)
    }

    async fn update_inventory_quantity(
        &self,
        draft: &TransactionDraft,
    ) -> StoreResult<CommitReceipt> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.pending_failure.take() {
            return Err(failure);
        }
        if draft.kind != TransactionType::Adjustment {
            return Err(RemoteFailure::new("quantity updates must be adjustments"));
        }
        if draft.quantity.is_negative() {
            return Err(RemoteFailure::new("quantity must not be negative"));
        }
        if !draft.quantity.is_within_max() {
            return Err(RemoteFailure::new("quantity would exceed the maximum"));
        }

        let item = state
            .items
            .iter_mut()
            .find(|i| i.name == draft.item_name)
            .ok_or_else(|| RemoteFailure::new(format!("unknown item '{}'", draft.item_name)))?;
        item.quantity = draft.quantity;
        let receipt = receipt(item.id.clone());

        state
            .transactions
            .push(Transaction::from_draft(draft, &receipt));
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{Category, FloorLocation};

    fn draft(kind: TransactionType, name: &str, units: i64) -> TransactionDraft {
        TransactionDraft {
            kind,
            item_name: name.to_string(),
            quantity: Quantity::from_units(units),
            unit: "kg".to_string(),
            location: Some(FloorLocation::Vendor),
            person_name: "Ravi".to_string(),
            notes: None,
            previous_quantity: None,
            category_hint: Some(Category::Pantry),
        }
    }

    #[tokio::test]
    async fn test_receive_onboards_item() {
        let store = MemoryStore::new();
        let receipt = store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 4))
            .await
            .unwrap();

        let items = store.fetch_inventory().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, receipt.item_id);
        assert_eq!(items[0].category, Category::Pantry);
        assert_eq!(store.fetch_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_call_commits_nothing() {
        let store = MemoryStore::new();
        store.fail_next(RemoteFailure::new("offline")).await;

        let err = store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 4))
            .await
            .unwrap_err();
        assert_eq!(err.raw_cause.as_deref(), Some("offline"));
        assert!(store.fetch_inventory().await.unwrap().is_empty());
        assert!(store.fetch_transactions().await.unwrap().is_empty());

        // The injected failure is consumed.
        assert!(store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 4))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_issue_rules() {
        let store = MemoryStore::new();
        assert!(store
            .submit_transaction(&draft(TransactionType::Issue, "Sugar", 1))
            .await
            .is_err());

        store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 2))
            .await
            .unwrap();
        assert!(store
            .submit_transaction(&draft(TransactionType::Issue, "Sugar", 3))
            .await
            .is_err());
        assert_eq!(store.fetch_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_quantity_records_adjustment() {
        let store = MemoryStore::new();
        store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 2))
            .await
            .unwrap();

        let mut adjustment = draft(TransactionType::Adjustment, "Sugar", 9);
        adjustment.location = None;
        adjustment.previous_quantity = Some(Quantity::from_units(2));
        store.update_inventory_quantity(&adjustment).await.unwrap();

        let items = store.fetch_inventory().await.unwrap();
        assert_eq!(items[0].quantity, Quantity::from_units(9));
        let txs = store.fetch_transactions().await.unwrap();
        assert_eq!(txs[1].kind, TransactionType::Adjustment);
        assert_eq!(txs[1].previous_quantity, Some(Quantity::from_units(2)));

        assert!(store
            .update_inventory_quantity(&draft(TransactionType::Receive, "Sugar", 1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_receive_never_exceeds_max() {
        let store = MemoryStore::new();
        store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 1))
            .await
            .unwrap();
        assert!(store.force_quantity("Sugar", Quantity::from_hundredths(i64::MAX - 10)).await);

        let err = store
            .submit_transaction(&draft(TransactionType::Receive, "Sugar", 1))
            .await
            .unwrap_err();
        assert!(err.raw_cause.is_some());
        assert_eq!(
            store.fetch_inventory().await.unwrap()[0].quantity,
            Quantity::from_hundredths(i64::MAX - 10)
        );
        assert_eq!(store.fetch_transactions().await.unwrap().len(), 1);

        let mut adjustment = draft(TransactionType::Adjustment, "Sugar", 0);
        adjustment.location = None;
        adjustment.quantity = Quantity::MAX + Quantity::from_hundredths(1);
        assert!(store.update_inventory_quantity(&adjustment).await.is_err());
    }
}
