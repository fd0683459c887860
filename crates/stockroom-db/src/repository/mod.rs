//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SqliteStore / seed                                                    │
//! │       │                                                                 │
//! │       │  db.items().list()                                             │
//! │       ▼                                                                 │
//! │  ItemRepository            TransactionRepository                       │
//! │  ├── list()                ├── list()                                  │
//! │  ├── get_by_name(name)     ├── list_for_item(name)                     │
//! │  └── insert(item)          └── get_by_id(id)                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`] - Catalog rows
//! - [`TransactionRepository`] - Ledger rows

pub mod item;
pub mod transaction;

pub use item::ItemRepository;
pub use transaction::TransactionRepository;
