//! Database location and write-conflict retry settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_path() -> String {
    ".judge/judge.db".to_string()
}

const fn default_max_attempts() -> u32 {
    8
}

const fn default_base_delay_ms() -> u64 {
    10
}

const fn default_max_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the local libSQL database file.
    #[serde(default = "default_path")]
    pub path: String,

    /// Attempts per transition before giving up on write conflicts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry, doubled on each subsequent one.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl DatabaseConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty or in-memory path,
    /// zero attempts, or a base delay above the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() || self.path == ":memory:" {
            return Err(ConfigError::invalid(
                "database.path",
                "a file path is required; each transition opens its own connection",
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("database.max_attempts", "must be at least 1"));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::invalid(
                "database.base_delay_ms",
                format!("{} exceeds max_delay_ms {}", self.base_delay_ms, self.max_delay_ms),
            ));
        }
        Ok(())
    }
}
