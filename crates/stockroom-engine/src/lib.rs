//! # stockroom-engine: Stock Update Processor for Stockroom
//!
//! Drives the pure `stockroom-core` logic against a remote inventory store.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Engine Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Session (one per operator)                    │  │
//! │  │                                                                  │  │
//! │  │  refresh()            fetch items + transactions, swap snapshot  │  │
//! │  │  submit(request)      Issue / Receive, at most one in flight     │  │
//! │  │  override_quantity()  Adjustment written to the Ledger           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              dyn InventoryStore (store.rs)                       │  │
//! │  │                                                                  │  │
//! │  │   MemoryStore (memory.rs)      SqliteStore (stockroom-db)        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  StockroomConfig (config.rs)     CredentialTable (auth.rs)             │
//! │  endpoint, exports, users        argon2 sign-in, role labels           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockroom_engine::{MemoryStore, Session};
//!
//! let session = Session::open(Arc::new(MemoryStore::new())).await?;
//! let tx = session.submit(&request).await?;
//! println!("Recorded {}", tx.id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod memory;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{hash_password, AuthError, Authenticator, CredentialTable, Role, UserEntry};
pub use config::{save_endpoint, stored_endpoint, StockroomConfig, StoreEndpoint};
pub use error::{EngineError, EngineResult};
pub use memory::MemoryStore;
pub use session::Session;
pub use store::{InventoryStore, RemoteFailure, StoreResult};
