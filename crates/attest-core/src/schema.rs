//! Table schemas for the attestation ledger
//!
//! A schema is an ordered list of columns. The key columns, taken in declaration
//! order, form the composite key that must be unique across the table, and they
//! are also the only columns a prefix match can constrain.
//!
//! # Example
//!
//! ```rust
//! use attest_core::schema::{quotes_schema, QUOTES_TABLE};
//!
//! let schema = quotes_schema();
//! assert_eq!(schema.name, QUOTES_TABLE);
//! assert_eq!(schema.key_len(), 4);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::row::{ColumnValue, Row};
use crate::storage::{TableError, TableResult};

/// Table holding client quotes.
pub const QUOTES_TABLE: &str = "Quotes";

/// Table holding validator verdicts on quotes.
pub const ATTESTATION_TABLE: &str = "Attestation";

/// Column types understood by the ledger host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Int64,
    Bool,
    Bytes,
}

/// A single column in a table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub key: bool,
}

impl ColumnDefinition {
    pub fn key(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            key: true,
        }
    }

    pub fn value(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            key: false,
        }
    }
}

/// A named table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Key columns in declaration order.
    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.key)
    }

    pub fn key_len(&self) -> usize {
        self.key_columns().count()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check the definition itself before a host creates the table.
    ///
    /// Names are restricted to ASCII alphanumerics and underscores so that
    /// backends can use them as identifiers.
    pub fn validate(&self) -> TableResult<()> {
        if !is_identifier(&self.name) {
            return Err(TableError::InvalidSchema(format!(
                "invalid table name '{}'",
                self.name
            )));
        }
        if self.columns.is_empty() {
            return Err(TableError::InvalidSchema(format!(
                "table '{}' has no columns",
                self.name
            )));
        }
        if self.key_len() == 0 {
            return Err(TableError::InvalidSchema(format!(
                "table '{}' has no key column",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_identifier(&column.name) {
                return Err(TableError::InvalidSchema(format!(
                    "invalid column name '{}' in table '{}'",
                    column.name, self.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::InvalidSchema(format!(
                    "duplicate column '{}' in table '{}'",
                    column.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Check that a row has this table's shape.
    pub fn check_row(&self, row: &Row) -> TableResult<()> {
        if row.len() != self.columns.len() {
            return Err(TableError::InvalidRow(format!(
                "table '{}' expects {} columns, got {}",
                self.name,
                self.columns.len(),
                row.len()
            )));
        }
        for (column, value) in self.columns.iter().zip(&row.columns) {
            if value.column_type() != column.column_type {
                return Err(TableError::InvalidRow(format!(
                    "column '{}' of table '{}' expects {:?}, got {:?}",
                    column.name,
                    self.name,
                    column.column_type,
                    value.column_type()
                )));
            }
        }
        Ok(())
    }

    /// Check that `prefix` can constrain the leading key columns.
    pub fn check_prefix(&self, prefix: &[ColumnValue]) -> TableResult<()> {
        let key_len = self.key_len();
        if prefix.len() > key_len {
            return Err(TableError::InvalidPrefix(format!(
                "table '{}' has {} key columns, prefix has {}",
                self.name,
                key_len,
                prefix.len()
            )));
        }
        for (column, value) in self.key_columns().zip(prefix) {
            if value.column_type() != column.column_type {
                return Err(TableError::InvalidPrefix(format!(
                    "key column '{}' of table '{}' expects {:?}, got {:?}",
                    column.name,
                    self.name,
                    column.column_type,
                    value.column_type()
                )));
            }
        }
        Ok(())
    }

    /// Extract the composite key of a row already checked with [`Self::check_row`].
    pub fn key_of(&self, row: &Row) -> Vec<ColumnValue> {
        self.columns
            .iter()
            .zip(&row.columns)
            .filter(|(column, _)| column.key)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Schema of the `Quotes` table.
pub fn quotes_schema() -> TableSchema {
    TableSchema::new(
        QUOTES_TABLE,
        vec![
            ColumnDefinition::key("hostname", ColumnType::String),
            ColumnDefinition::key("userid", ColumnType::String),
            ColumnDefinition::key("timestamp", ColumnType::String),
            ColumnDefinition::key("nonce", ColumnType::String),
            ColumnDefinition::value("quote", ColumnType::String),
            ColumnDefinition::value("eventlog", ColumnType::String),
        ],
    )
}

/// Schema of the `Attestation` table.
///
/// `quote_timestamp` and `quote_nonce` point back at a row in `Quotes`; nothing
/// checks that the quote exists.
pub fn attestation_schema() -> TableSchema {
    TableSchema::new(
        ATTESTATION_TABLE,
        vec![
            ColumnDefinition::key("client_hostname", ColumnType::String),
            ColumnDefinition::key("validator_hostname", ColumnType::String),
            ColumnDefinition::key("timestamp", ColumnType::String),
            ColumnDefinition::key("quote_timestamp", ColumnType::String),
            ColumnDefinition::key("quote_nonce", ColumnType::String),
            ColumnDefinition::value("is_valid", ColumnType::String),
        ],
    )
}
