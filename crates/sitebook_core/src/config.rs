//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve log level, log directory and database path for binaries.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never touches the file system.
//! - Default paths live under the per-user data dir, not the temp dir.

use crate::logging::{default_log_level, LoggingConfig};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "SITEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SITEBOOK_LOG_DIR";
pub const ENV_DB_PATH: &str = "SITEBOOK_DB_PATH";

const DEFAULT_DATA_DIR_NAME: &str = "sitebook";
const DEFAULT_DB_FILE_NAME: &str = "sitebook.sqlite3";

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an injectable variable lookup.
    ///
    /// Defaults: build-mode log level, `<data>/sitebook/logs` and
    /// `<data>/sitebook/sitebook.sqlite3`, see [`default_data_dir`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let data_dir = default_data_dir();

        Self {
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("logs")),
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(DEFAULT_DB_FILE_NAME)),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

/// Per-user application data directory for sitebook.
///
/// Falls back to the temp dir only when the platform reports no data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_DATA_DIR_NAME)
}
