//! Error types for the persistence layer

use std::path::PathBuf;
use thiserror::Error;

use spravochnik_fields::FieldsError;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in store and session operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity kind was never registered with the store
    #[error("unknown entity: {name}")]
    UnknownEntity { name: String },

    /// Field not part of the entity's schema
    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Update or delete addressed a record that has no identity yet
    #[error("{entity} record has no identity")]
    NotPersisted { entity: String },

    /// Update addressed a row that no longer exists
    #[error("{entity} row not found: {id}")]
    RowNotFound { entity: String, id: i64 },

    /// A stored value could not be read back as its field's type
    #[error("cannot decode {entity}.{field}: {message}")]
    Decode {
        entity: String,
        field: String,
        message: String,
    },

    /// The staged batch was refused as a whole; it is still staged
    #[error("commit rejected: {source}")]
    CommitRejected {
        #[source]
        source: rusqlite::Error,
    },

    /// Database location could not be prepared
    #[error("cannot prepare database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema or field access error
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Create a decode error
    pub fn decode(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Decode {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown entity error
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unknown_entity("students");
        assert_eq!(err.to_string(), "unknown entity: students");
    }

    #[test]
    fn test_decode_error() {
        let err = StoreError::decode("departments", "budget", "not a number");
        assert_eq!(
            err.to_string(),
            "cannot decode departments.budget: not a number"
        );
    }
}
