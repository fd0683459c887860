//! # stockroom-core: Pure Inventory Logic for Stockroom
//!
//! This crate is the **heart** of Stockroom. It holds the inventory and
//! transaction reconciliation rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (`stockroom`)                       │   │
//! │  │    items ──► issue / receive / adjust ──► history ──► export    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           stockroom-engine (Session, submit, store trait)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │  ledger   │  │ processor │  │   query   │  │   │
//! │  │   │  Catalog  │  │  Ledger   │  │ Snapshot  │  │  filters  │  │   │
//! │  │   │  levels   │  │  replay   │  │ validate  │  │  summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                stockroom-db (SQLite inventory store)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Fixed-point stock amounts (hundredths, no floating point)
//! - [`types`] - Item, Transaction, requests, drafts and receipts
//! - [`catalog`] - Current stock levels keyed by item name
//! - [`ledger`] - Append-only transaction history and replay
//! - [`processor`] - Validation and local application of movements
//! - [`query`] - Catalog and ledger filters, dashboard projections
//! - [`export`] - CSV and printable report encoding
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::processor::{validate_submission, Snapshot};
//! use stockroom_core::{Category, FloorLocation, Item, Quantity, SubmitRequest, TransactionType};
//!
//! let snapshot = Snapshot::new(
//!     vec![Item {
//!         id: "HK-001".into(),
//!         name: "Tissue Roll".into(),
//!         category: Category::Housekeeping,
//!         quantity: Quantity::from_units(10),
//!         unit: "pcs".into(),
//!         min_level: Quantity::from_units(5),
//!     }],
//!     vec![],
//! )
//! .unwrap();
//!
//! let draft = validate_submission(
//!     &snapshot,
//!     &SubmitRequest {
//!         kind: TransactionType::Issue,
//!         item_name: "Tissue Roll".into(),
//!         quantity: Quantity::from_units(3),
//!         unit: None,
//!         location: FloorLocation::GroundFloor,
//!         person_name: "Asha".into(),
//!         notes: None,
//!         category_hint: None,
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(draft.unit, "pcs");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod export;
pub mod ledger;
pub mod processor;
pub mod quantity;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::Ledger;
pub use processor::Snapshot;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of item and person names.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length of a unit of measure ("pcs", "kg", "bottles").
pub const MAX_UNIT_LENGTH: usize = 20;

/// Maximum length of transaction notes.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Issues shown on the dashboard when no limit is given.
pub const DEFAULT_RECENT_ISSUES: usize = 5;

/// File name prefix for exports.
pub const DEFAULT_FILE_PREFIX: &str = "stockroom";

/// Title printed at the top of tabular reports.
pub const DEFAULT_REPORT_TITLE: &str = "Stockroom - Inventory Report";
