//! Error types for the record grid and its editors

use thiserror::Error;

use spravochnik_fields::FieldsError;
use spravochnik_store::StoreError;

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur in grid operations
#[derive(Debug, Error)]
pub enum GridError {
    /// Row index past the end of the working set
    #[error("row {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// Column index past the end of the schema
    #[error("column {column} out of range ({columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    /// Attempt to edit the identity column
    #[error("column '{field}' is read-only")]
    ReadOnlyColumn { field: String },

    /// Commit refused; staged changes are kept so the user can fix and retry
    #[error("changes to {entity} were not saved: {source}")]
    CommitFailed {
        entity: String,
        #[source]
        source: StoreError,
    },

    /// Persistence session error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Field access error
    #[error(transparent)]
    Fields(#[from] FieldsError),
}

/// Why an editor could not turn its input into a value.
///
/// These never reach the grid: the edit is dropped and the cell keeps its value.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    /// Text that does not parse as the field's type
    #[error("cannot parse {input:?}: {message}")]
    Unparsable { input: String, message: String },

    /// Parsed value outside the editor's bounds
    #[error("{value} is outside {min}..={max}")]
    OutOfRange {
        value: String,
        min: String,
        max: String,
    },

    /// Editor handed a surface it did not create
    #[error("expected a {expected} surface, got {found}")]
    WrongSurface {
        expected: &'static str,
        found: &'static str,
    },

    /// Choice surface with no valid current option
    #[error("no option selected")]
    NoSelection,
}

impl EditorError {
    /// Create an unparsable input error
    pub fn unparsable(input: impl Into<String>, message: impl ToString) -> Self {
        Self::Unparsable {
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(value: impl ToString, min: impl ToString, max: impl ToString) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}
