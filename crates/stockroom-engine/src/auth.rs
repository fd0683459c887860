//! # Sign-In
//!
//! A pluggable `Authenticator` and the config-backed `CredentialTable`.
//!
//! Roles are labels shown to the user. No operation is gated on them.
//!
//! ```text
//! username, password ──► trim ──► find user (case-insensitive)
//!                                      │
//!                                      ▼
//!                         argon2 verify(password, PHC hash)
//!                                      │
//!                         ┌────────────┴────────────┐
//!                         ▼                         ▼
//!                     Ok(Role)             Err(AuthError::Rejected)
//! ```

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::error::EngineError;

// =============================================================================
// Roles
// =============================================================================

/// Label attached to a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown user or wrong password. The two are not distinguished.
    #[error("Invalid username or password")]
    Rejected,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Failed to hash password: {0}")]
    HashFailed(String),
}

impl From<AuthError> for EngineError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected => EngineError::AuthRejected,
            other => EngineError::InvalidConfig(other.to_string()),
        }
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Checks a username and password and returns the user's role.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<Role, AuthError>;
}

/// One `[[users]]` entry of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub role: Role,
    /// Argon2 hash in PHC string format.
    pub password_hash: String,
}

impl UserEntry {
    /// Checks that the entry can ever match.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.username.trim().is_empty() {
            return Err(EngineError::InvalidConfig("users.username must not be empty".into()));
        }
        PasswordHash::new(&self.password_hash).map_err(|e| {
            EngineError::InvalidConfig(format!(
                "users.password_hash for '{}' is not a PHC string: {}",
                self.username, e
            ))
        })?;
        Ok(())
    }
}

/// Credential table loaded from config.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    users: Vec<UserEntry>,
}

impl CredentialTable {
    pub fn new(users: Vec<UserEntry>) -> Self {
        CredentialTable { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn find(&self, username: &str) -> Option<&UserEntry> {
        let username = username.trim();
        self.users
            .iter()
            .find(|u| u.username.trim().eq_ignore_ascii_case(username))
    }
}

#[async_trait]
impl Authenticator for CredentialTable {
    async fn verify(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        let user = self.find(username).ok_or_else(|| {
            debug!(username = %username.trim(), "Sign-in for unknown user");
            AuthError::Rejected
        })?;

        if verify_password(password.trim(), &user.password_hash) {
            debug!(username = %user.username, role = %user.role, "Sign-in accepted");
            Ok(user.role)
        } else {
            debug!(username = %user.username, "Sign-in rejected");
            Err(AuthError::Rejected)
        }
    }
}

// =============================================================================
// Hashing
// =============================================================================

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hashes a password for a `[[users]]` entry.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashFailed(e.to_string()))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CredentialTable {
        CredentialTable::new(vec![
            UserEntry {
                username: "admin".into(),
                role: Role::Admin,
                password_hash: hash_password("admin123").unwrap(),
            },
            UserEntry {
                username: "staff".into(),
                role: Role::Staff,
                password_hash: hash_password("staff123").unwrap(),
            },
        ])
    }

    #[tokio::test]
    async fn test_verify_returns_role() {
        let table = table();
        assert_eq!(table.verify("admin", "admin123").await, Ok(Role::Admin));
        assert_eq!(table.verify("staff", "staff123").await, Ok(Role::Staff));
    }

    #[tokio::test]
    async fn test_username_is_case_insensitive_and_trimmed() {
        let table = table();
        assert_eq!(table.verify("  ADMIN ", " admin123 ").await, Ok(Role::Admin));
    }

    #[tokio::test]
    async fn test_rejections() {
        let table = table();
        assert_eq!(table.verify("admin", "staff123").await, Err(AuthError::Rejected));
        assert_eq!(table.verify("nobody", "admin123").await, Err(AuthError::Rejected));
        assert_eq!(table.verify("", "").await, Err(AuthError::Rejected));
    }

    #[test]
    fn test_entry_validation() {
        let mut entry = UserEntry {
            username: "manager".into(),
            role: Role::Manager,
            password_hash: hash_password("manager123").unwrap(),
        };
        assert!(entry.validate().is_ok());

        entry.password_hash = "manager123".into();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Staff.to_string(), "Staff");
    }
}
