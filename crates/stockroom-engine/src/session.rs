//! # Session: the Stock Update Processor entry point
//!
//! A `Session` owns one store handle and the current snapshot.
//!
//! ## Submit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(request)                                                        │
//! │     │                                                                   │
//! │     ├── try_lock(in_flight) ── busy ──► SubmissionInFlight              │
//! │     │                                                                   │
//! │     ├── validate_submission(snapshot) ── Err ──► Validation             │
//! │     │                                    (store never called)           │
//! │     │                                                                   │
//! │     ├── store.submit_transaction(draft) ── Err ──► RemoteFailure        │
//! │     │                                      (snapshot untouched)         │
//! │     │                                                                   │
//! │     └── snapshot.with_commit(draft, receipt)                            │
//! │            │                                                            │
//! │            ├── Ok  ──► swap in new Arc<Snapshot>, return Transaction    │
//! │            └── Err ──► refresh from store (local view had drifted)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reads
//! `refresh()` and `snapshot()` never take the in-flight guard. A reader
//! holding an `Arc<Snapshot>` keeps seeing that snapshot; callers re-read
//! after a mutation resolves to see its effect.

use std::sync::Arc;

use stockroom_core::processor::{validate_override, validate_submission, Snapshot};
use stockroom_core::{OverrideRequest, SubmitRequest, Transaction, TransactionDraft, TransactionType};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::store::{InventoryStore, RemoteFailure};

/// One operator's view of the inventory.
pub struct Session {
    store: Arc<dyn InventoryStore>,
    snapshot: RwLock<Arc<Snapshot>>,
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session with an empty snapshot. Call [`refresh`](Self::refresh)
    /// before submitting.
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Session {
            store,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            in_flight: Mutex::new(()),
        }
    }

    /// Creates a session and loads its first snapshot.
    pub async fn open(store: Arc<dyn InventoryStore>) -> EngineResult<Self> {
        let session = Session::new(store);
        session.refresh().await?;
        Ok(session)
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Re-fetches items and transactions and replaces the snapshot.
    pub async fn refresh(&self) -> EngineResult<Arc<Snapshot>> {
        let (items, transactions) = tokio::try_join!(
            self.store.fetch_inventory(),
            self.store.fetch_transactions()
        )
        .map_err(|failure| {
            warn!(cause = ?failure.raw_cause, "Refresh failed");
            EngineError::from(failure)
        })?;

        let snapshot = Snapshot::new(items, transactions).map_err(|e| {
            warn!(error = %e, "Store returned inconsistent data");
            EngineError::from(RemoteFailure::new(format!("inconsistent store data: {}", e)))
        })?;
        let snapshot = Arc::new(snapshot);

        info!(
            items = snapshot.catalog().len(),
            transactions = snapshot.ledger().len(),
            "Snapshot refreshed"
        );
        *self.snapshot.write().await = snapshot.clone();
        Ok(snapshot)
    }

    /// Validates and commits an Issue or Receive.
    ///
    /// ## Errors
    /// - `SubmissionInFlight` if another submit/override is pending
    /// - `Validation` if the request breaks a stock rule (store not called)
    /// - `RemoteFailure` if the store did not commit (nothing changed)
    pub async fn submit(&self, request: &SubmitRequest) -> EngineResult<Transaction> {
        let _guard = self.begin()?;

        let current = self.snapshot().await;
        let draft = validate_submission(&current, request).map_err(|e| {
            info!(item = %request.item_name, kind = %request.kind, error = %e, "Submission rejected");
            e
        })?;

        self.commit(draft).await
    }

    /// Sets an item's quantity directly, recording an Adjustment.
    ///
    /// ## Errors
    /// Same as [`submit`](Self::submit); `InvalidQuantity` for a negative level.
    pub async fn override_quantity(&self, request: &OverrideRequest) -> EngineResult<Transaction> {
        let _guard = self.begin()?;

        let current = self.snapshot().await;
        let draft = validate_override(&current, request).map_err(|e| {
            info!(item = %request.item_name, error = %e, "Override rejected");
            e
        })?;

        self.commit(draft).await
    }

    fn begin(&self) -> EngineResult<tokio::sync::MutexGuard<'_, ()>> {
        self.in_flight.try_lock().map_err(|_| {
            debug!("Rejecting stock update while another is pending");
            EngineError::SubmissionInFlight
        })
    }

    async fn commit(&self, draft: TransactionDraft) -> EngineResult<Transaction> {
        let outcome = match draft.kind {
            TransactionType::Adjustment => self.store.update_inventory_quantity(&draft).await,
            TransactionType::Issue | TransactionType::Receive => {
                self.store.submit_transaction(&draft).await
            }
        };

        let receipt = outcome.map_err(|failure| {
            warn!(
                item = %draft.item_name,
                kind = %draft.kind,
                cause = ?failure.raw_cause,
                "Store did not commit"
            );
            EngineError::from(failure)
        })?;

        let mut slot = self.snapshot.write().await;
        match slot.with_commit(&draft, &receipt) {
            Ok((next, tx)) => {
                *slot = Arc::new(next);
                info!(
                    transaction_id = %tx.id,
                    item = %tx.item_name,
                    kind = %tx.kind,
                    quantity = %tx.quantity,
                    "Stock update committed"
                );
                Ok(tx)
            }
            Err(e) => {
                drop(slot);
                warn!(
                    transaction_id = %receipt.transaction_id,
                    error = %e,
                    "Committed change does not apply to the local snapshot; refreshing"
                );
                let tx = Transaction::from_draft(&draft, &receipt);
                match self.refresh().await {
                    Ok(_) => Ok(tx),
                    Err(refresh_err) => Err(EngineError::CommittedButStale {
                        transaction_id: tx.id,
                        cause: match refresh_err.raw_cause() {
                            Some(raw) => format!("refresh failed: {}", raw),
                            None => "refresh failed".to_string(),
                        },
                    }),
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
