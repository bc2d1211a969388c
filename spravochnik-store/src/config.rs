//! Storage settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the database lives and how each session connection is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Turn on SQLite foreign key enforcement. References are declared
    /// deferrable, so violations surface when a session commits.
    pub enforce_foreign_keys: bool,
    /// How long a session waits on a lock held by another connection.
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    pub fn with_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("spravochnik.db"),
            enforce_foreign_keys: true,
            busy_timeout_ms: 5000,
        }
    }
}
