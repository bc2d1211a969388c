//! Error types for entity descriptors and field access

use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while describing or accessing entity fields
#[derive(Debug, Error)]
pub enum FieldsError {
    /// A setter received a value of the wrong semantic type
    #[error("type mismatch on field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Column index past the end of the schema
    #[error("column {column} out of range for entity '{entity}'")]
    ColumnOutOfRange { entity: String, column: usize },

    /// Descriptor breaks a schema rule (identity placement, duplicate names, ...)
    #[error("invalid entity '{entity}': {message}")]
    InvalidEntity { entity: String, message: String },
}

impl FieldsError {
    /// Create a type mismatch error
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }

    /// Create an invalid entity error
    pub fn invalid_entity(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            entity: entity.into(),
            message: message.into(),
        }
    }
}
