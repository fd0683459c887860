//! # Engine Error Types
//!
//! Error types for store-facing operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │     Remote      │  │     Configuration       │ │
//! │  │  (local, no     │  │  (store call)   │  │                         │ │
//! │  │   state change) │  │                 │  │  InvalidConfig          │ │
//! │  │  Validation     │  │  RemoteFailure  │  │  ConfigLoadFailed       │ │
//! │  │  (CoreError)    │  │  CommittedBut-  │  │  ConfigSaveFailed       │ │
//! │  │                 │  │  Stale          │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │   Concurrency   │  │      Auth       │                              │
//! │  │  SubmissionIn-  │  │  AuthRejected   │                              │
//! │  │  Flight         │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote failures are reported as-is: nothing here retries.

use stockroom_core::CoreError;
use thiserror::Error;

use crate::store::RemoteFailure;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type covering every failure a caller can observe.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Local Errors
    // =========================================================================
    /// A request failed local validation; the store was not called.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A submit or override is already waiting on the store.
    ///
    /// ## When This Occurs
    /// The caller started a second mutation before the first resolved.
    /// The second call is rejected, not queued.
    #[error("Another stock update is still in progress; wait for it to finish")]
    SubmissionInFlight,

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The store call failed or could not complete. Nothing was committed.
    #[error("The inventory store did not save the change")]
    RemoteFailure { raw_cause: Option<String> },

    /// The store committed, but the local snapshot could not be brought
    /// up to date. Refresh before trusting displayed quantities.
    #[error("Change {transaction_id} was saved, but the local view is out of date: {cause}")]
    CommittedButStale {
        transaction_id: String,
        cause: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Authentication Errors
    // =========================================================================
    /// Username or password did not match.
    #[error("Invalid username or password")]
    AuthRejected,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<RemoteFailure> for EngineError {
    fn from(err: RemoteFailure) -> Self {
        EngineError::RemoteFailure {
            raw_cause: err.raw_cause,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl EngineError {
    /// Returns true if the request was rejected locally.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    /// Returns true if the store call failed.
    ///
    /// Retrying means issuing a brand-new submit.
    pub fn is_remote(&self) -> bool {
        matches!(self, EngineError::RemoteFailure { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_)
                | EngineError::ConfigLoadFailed(_)
                | EngineError::ConfigSaveFailed(_)
        )
    }

    /// The store's own description of a remote failure, if it gave one.
    pub fn raw_cause(&self) -> Option<&str> {
        match self {
            EngineError::RemoteFailure { raw_cause } => raw_cause.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let validation: EngineError = CoreError::ItemNotFound("Soap".into()).into();
        assert!(validation.is_validation());
        assert!(!validation.is_remote());

        let remote: EngineError = RemoteFailure::new("disk full").into();
        assert!(remote.is_remote());
        assert_eq!(remote.raw_cause(), Some("disk full"));

        assert!(EngineError::InvalidConfig("bad".into()).is_config_error());
        assert!(!EngineError::SubmissionInFlight.is_remote());
    }

    #[test]
    fn test_validation_display_is_transparent() {
        let err: EngineError = CoreError::ItemNotFound("Soap".into()).into();
        assert_eq!(err.to_string(), "Item not found: Soap");
    }

    #[test]
    fn test_remote_failure_hides_cause_from_message() {
        let err: EngineError = RemoteFailure::new("constraint failed").into();
        assert_eq!(err.to_string(), "The inventory store did not save the change");
    }
}
