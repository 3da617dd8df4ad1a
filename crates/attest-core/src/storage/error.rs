//! Ledger-table error types

use thiserror::Error;

/// Errors reported by a ledger-table host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Table with this name already exists
    #[error("table already exists: {0}")]
    AlreadyExists(String),

    /// Table not found
    #[error("table not found: {0}")]
    NotFound(String),

    /// Table definition rejected by the host
    #[error("invalid table definition: {0}")]
    InvalidSchema(String),

    /// Row does not have the table's shape
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// Prefix cannot be matched against the table's key
    #[error("invalid key prefix: {0}")]
    InvalidPrefix(String),

    /// Storage backend error (database, filesystem, etc.)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for ledger-table operations
pub type TableResult<T> = Result<T, TableError>;
