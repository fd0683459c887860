//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                      │
//! │  ├── CoreError        - Stock rule violations (local, pre-commit)       │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stockroom-engine errors (separate crate)                               │
//! │  └── EngineError      - RemoteFailure, SubmissionInFlight, config       │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → CLI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is detected locally and is raised before any remote
//! call; when one is returned, no state has changed.

use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Stock rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Item name does not resolve in the Catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Issue larger than the quantity on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Issue "Tissue Roll" (qty: 3)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Tissue Roll", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// "Insufficient stock for Tissue Roll: only 2 pcs available, requested 3"
    /// ```
    #[error("Insufficient stock for {item}: only {available} {unit} available, requested {requested}")]
    InsufficientStock {
        item: String,
        unit: String,
        available: Quantity,
        requested: Quantity,
    },

    /// A delta would drive the stored quantity below zero.
    #[error("Quantity of {item} would go negative: {current} + ({delta})")]
    WouldGoNegative {
        item: String,
        current: Quantity,
        delta: Quantity,
    },

    /// A Receive would lift the level above [`Quantity::MAX`].
    #[error("Receiving {requested} {unit} of {item} would exceed the maximum stock level: {current} on hand, limit {limit}", limit = Quantity::MAX)]
    ExceedsMaximum {
        item: String,
        unit: String,
        current: Quantity,
        requested: Quantity,
    },

    /// A stock level (quantity or min level) was negative.
    #[error("Invalid quantity for {item}: {value} (must not be negative)")]
    InvalidQuantity { item: String, value: Quantity },

    /// Item name already present in the Catalog.
    #[error("Duplicate item name: {0}")]
    DuplicateItem(String),

    /// Transaction id already present in the Ledger.
    #[error("Duplicate transaction id: {0}")]
    DuplicateTransaction(String),

    /// Export encoding failed.
    #[error("Export encoding failed: {0}")]
    Encoding(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is above the largest quantity tracked.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Quantity },

    /// Invalid format (e.g., unparseable quantity or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Value must be unique but already exists.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn not_allowed<I, S>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationError::NotAllowed {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
