//! Error types for record store operations

use thiserror::Error;

use crate::storage::TableError;

/// Errors returned to the transaction submitter.
///
/// Every error is terminal for the invoking transaction; nothing is retried
/// locally.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Wrong number of positional arguments
    #[error("{operation} expects {expected} argument(s), got {actual}")]
    Arity {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// Table create failed
    #[error("failed to create {table} table: {source}")]
    Schema {
        table: String,
        #[source]
        source: TableError,
    },

    /// Composite key already present
    #[error("{0}")]
    DuplicateRecord(String),

    /// Host failure on insert or query setup
    #[error("storage error: {0}")]
    Storage(#[from] TableError),

    /// Query result could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No operation with this name
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl LedgerError {
    /// Whether the submitter can succeed by changing its request.
    ///
    /// Wrong arity and duplicate keys are business conditions, not faults.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            LedgerError::Arity { .. }
                | LedgerError::DuplicateRecord(_)
                | LedgerError::UnknownOperation(_)
        )
    }
}

/// Result type alias using LedgerError.
pub type Result<T> = std::result::Result<T, LedgerError>;
