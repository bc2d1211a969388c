//! Error types for Spravochnik

use thiserror::Error;

use spravochnik_grid::GridError;
use spravochnik_store::StoreError;

/// Result type for application-level operations
pub type Result<T> = std::result::Result<T, SpravochnikError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Current directory could not be determined
    #[error("Unable to determine current directory: {source}")]
    CurrentDirectory {
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the application layer
#[derive(Error, Debug)]
pub enum SpravochnikError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store bootstrap or session failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Grid operation failure
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Table name not in the catalog
    #[error("unknown table '{0}'")]
    UnknownTable(String),
}
