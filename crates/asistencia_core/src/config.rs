//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Defaults live under the system temp directory so a fresh checkout runs
//!   without any setup.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ASISTENCIA_DB_PATH";
pub const ENV_LOG_DIR: &str = "ASISTENCIA_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "ASISTENCIA_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "asistencia.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "asistencia-logs";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Normalized level string (`trace|debug|info|warn|error`).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        }
    }
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    ///
    /// Unsupported log levels are rejected rather than silently replaced.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level)?.to_string();
        }
        Ok(config)
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Result<Self, LoggingError> {
        self.log_level = normalize_level(level)?.to_string();
        Ok(self)
    }
}
