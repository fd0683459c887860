//! # Remote Inventory Store Contract
//!
//! The one collaborator the engine depends on.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       InventoryStore                                    │
//! │                                                                         │
//! │  fetch_inventory()              ──► Vec<Item>          (store order)    │
//! │  fetch_transactions()           ──► Vec<Transaction>                    │
//! │  submit_transaction(draft)      ──► CommitReceipt                       │
//! │      Issue / Receive: Ledger row + Catalog change, atomically           │
//! │  update_inventory_quantity(adj) ──► CommitReceipt                       │
//! │      Adjustment: Ledger row + absolute level, atomically                │
//! │                                                                         │
//! │  Every call: Ok(..) = committed in full                                 │
//! │              Err(RemoteFailure) = nothing committed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancellation and timeouts belong to the implementation's transport.
//! The contract does no optimistic-concurrency checking: the last write the
//! store sees wins.

use async_trait::async_trait;
use stockroom_core::{CommitReceipt, Item, Transaction, TransactionDraft};
use thiserror::Error;

/// A store call that failed or could not complete.
///
/// `raw_cause` is whatever the store could say about it (a driver message,
/// a constraint name). It is for logs, not for users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote store failure: {}", raw_cause.as_deref().unwrap_or("no cause given"))]
pub struct RemoteFailure {
    pub raw_cause: Option<String>,
}

impl RemoteFailure {
    pub fn new(cause: impl Into<String>) -> Self {
        RemoteFailure {
            raw_cause: Some(cause.into()),
        }
    }

    /// A failure with no further detail.
    pub fn unspecified() -> Self {
        RemoteFailure { raw_cause: None }
    }
}

/// Result type alias for store calls.
pub type StoreResult<T> = Result<T, RemoteFailure>;

/// Where items and transactions live.
///
/// ## Implementations
/// - [`MemoryStore`](crate::memory::MemoryStore): in-process, for tests and demos
/// - `SqliteStore` in `stockroom-db`: durable local database
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All items, in the store's order.
    async fn fetch_inventory(&self) -> StoreResult<Vec<Item>>;

    /// All committed transactions.
    async fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>>;

    /// Commits an Issue or Receive and its quantity change as one unit.
    ///
    /// A Receive naming an unknown item creates it (category from
    /// `draft.category_hint`, min level 0).
    async fn submit_transaction(&self, draft: &TransactionDraft) -> StoreResult<CommitReceipt>;

    /// Sets an item's level to `draft.quantity` and records the Adjustment.
    async fn update_inventory_quantity(&self, draft: &TransactionDraft)
        -> StoreResult<CommitReceipt>;
}
