//! Error types for the SQLite ledger host

use attest_core::TableError;
use thiserror::Error;

/// Result type for SQLite host operations
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors that can occur during SQLite host operations
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database connection or query error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog entry could not be read back
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert SqliteError to TableError for the ledger-table trait
impl From<SqliteError> for TableError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Database(e) => TableError::Backend(format!("SQLite: {}", e)),
            SqliteError::Json(e) => TableError::Backend(format!("catalog JSON: {}", e)),
            SqliteError::Catalog(msg) => TableError::Backend(format!("Catalog: {}", msg)),
            SqliteError::Migration(msg) => TableError::Backend(format!("Migration: {}", msg)),
            SqliteError::Io(e) => TableError::Backend(format!("IO: {}", e)),
        }
    }
}
