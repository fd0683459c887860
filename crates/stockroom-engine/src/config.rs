//! # Stockroom Configuration
//!
//! Where the inventory store lives, where exports go, and who may sign in.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOCKROOM_STORE_ENDPOINT=sqlite:///var/lib/stockroom/stock.db       │
//! │     STOCKROOM_EXPORT_DIR=/srv/reports                                   │
//! │     STOCKROOM_FILE_PREFIX=tower_a                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                          │
//! │     ~/Library/Application Support/com.stockroom.stockroom/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     sqlite database in the platform data directory                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! endpoint = "sqlite:///home/ops/.local/share/stockroom/stockroom.db"
//!
//! [export]
//! directory = "/home/ops/reports"
//! file_prefix = "stockroom"
//! report_title = "Stockroom - Inventory Report"
//!
//! [[users]]
//! username = "admin"
//! role = "admin"
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use stockroom_core::{DEFAULT_FILE_PREFIX, DEFAULT_REPORT_TITLE};

use crate::auth::UserEntry;
use crate::error::{EngineError, EngineResult};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "stockroom.toml";

/// Name of the default database file inside the platform data directory.
pub const DEFAULT_DB_FILE_NAME: &str = "stockroom.db";

// =============================================================================
// Store Endpoint
// =============================================================================

/// Parsed form of `[store] endpoint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEndpoint {
    /// `sqlite://<path>`: durable SQLite database file.
    Sqlite(PathBuf),
    /// `memory://`: process-local store, empty at start.
    Memory,
}

impl fmt::Display for StoreEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEndpoint::Sqlite(path) => write!(f, "sqlite://{}", path.display()),
            StoreEndpoint::Memory => write!(f, "memory://"),
        }
    }
}

impl FromStr for StoreEndpoint {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "memory://" || s.eq_ignore_ascii_case("memory") {
            return Ok(StoreEndpoint::Memory);
        }
        match s.strip_prefix("sqlite://") {
            Some(path) if !path.is_empty() => Ok(StoreEndpoint::Sqlite(PathBuf::from(path))),
            _ => Err(EngineError::InvalidConfig(format!(
                "Unknown store endpoint: '{}'. Use sqlite://<path> or memory://",
                s
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// `sqlite://<path>` or `memory://`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    let path = directories::ProjectDirs::from("com", "stockroom", "stockroom")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
    StoreEndpoint::Sqlite(path).to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            endpoint: default_endpoint(),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory export files are written to.
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,

    /// File name prefix: `<prefix>_inventory_<date>.csv`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// First line of printable reports.
    #[serde(default = "default_report_title")]
    pub report_title: String,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            directory: default_export_dir(),
            file_prefix: default_file_prefix(),
            report_title: default_report_title(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Stockroom configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockroomConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub export: ExportSettings,

    /// Credential table. Empty means sign-in is not required.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserEntry>,
}

impl StockroomConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::read_file(config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reads the file alone, without environment overrides.
    fn read_file(config_path: Option<PathBuf>) -> EngineResult<Self> {
        match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading stockroom config from file");
                let contents = std::fs::read_to_string(&path)?;
                Ok(toml::from_str(&contents)?)
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Stockroom config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        self.store_endpoint()?;

        let prefix = self.export.file_prefix.trim();
        if prefix.is_empty() {
            return Err(EngineError::InvalidConfig(
                "export.file_prefix must not be empty".into(),
            ));
        }
        if prefix.contains(['/', '\\']) {
            return Err(EngineError::InvalidConfig(format!(
                "export.file_prefix must not contain path separators, got: {}",
                prefix
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for user in &self.users {
            user.validate()?;
            if !seen.insert(user.username.trim().to_lowercase()) {
                return Err(EngineError::InvalidConfig(format!(
                    "Duplicate user: {}",
                    user.username
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("STOCKROOM_STORE_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding store endpoint from environment");
            self.store.endpoint = endpoint;
        }

        if let Some(dir) = lookup("STOCKROOM_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export directory from environment");
            self.export.directory = PathBuf::from(dir);
        }

        if let Some(prefix) = lookup("STOCKROOM_FILE_PREFIX") {
            self.export.file_prefix = prefix;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "stockroom")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the parsed store endpoint.
    pub fn store_endpoint(&self) -> EngineResult<StoreEndpoint> {
        self.store.endpoint.parse()
    }

    /// Returns true if sign-in is required for mutating commands.
    pub fn requires_sign_in(&self) -> bool {
        !self.users.is_empty()
    }

    /// Full path for an export file name.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        self.export.directory.join(file_name)
    }
}

// =============================================================================
// Stored Endpoint
// =============================================================================

/// The endpoint currently saved in the config file.
///
/// Environment overrides are not applied: this is what `save_endpoint`
/// would change.
pub fn stored_endpoint(config_path: Option<&Path>) -> EngineResult<String> {
    let config = StockroomConfig::read_file(config_path.map(Path::to_path_buf))?;
    Ok(config.store.endpoint)
}

/// Saves a new store endpoint, keeping the rest of the file.
///
/// ## Errors
/// - `InvalidConfig` if the endpoint does not parse (nothing is written)
pub fn save_endpoint(config_path: Option<&Path>, endpoint: &str) -> EngineResult<PathBuf> {
    let parsed: StoreEndpoint = endpoint.parse()?;

    let path = config_path.map(Path::to_path_buf);
    let mut config = StockroomConfig::read_file(path.clone())?;
    config.store.endpoint = parsed.to_string();
    config.validate()?;
    config.save(path)
}
