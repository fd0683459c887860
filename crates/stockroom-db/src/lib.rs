//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite implementation of the inventory store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          stockroom-db                                   │
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────────┐   ┌─────────────────────────┐   │
//! │  │  Database   │──►│  Repositories   │◄──│  SqliteStore            │   │
//! │  │  (pool.rs)  │   │  item.rs        │   │  (store.rs)             │   │
//! │  │             │   │  transaction.rs │   │  impl InventoryStore    │   │
//! │  └─────────────┘   └─────────────────┘   └─────────────────────────┘   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  migrations/001_initial_schema.sql (embedded)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockroom_db::{Database, DbConfig, SqliteStore};
//! use stockroom_engine::Session;
//!
//! let db = Database::new(DbConfig::new("./stockroom.db")).await?;
//! let session = Session::open(Arc::new(SqliteStore::new(db))).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{ItemRepository, TransactionRepository};
pub use store::SqliteStore;
