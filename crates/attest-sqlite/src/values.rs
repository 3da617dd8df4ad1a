//! Conversions between ledger values and SQLite storage
//!
//! Column definitions live in the catalog as JSON; column values map onto
//! SQLite storage classes by declared column type.

use attest_core::{ColumnDefinition, ColumnType, ColumnValue};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use crate::error::{Result, SqliteError};

/// SQLite type affinity for a ledger column type
pub fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::String => "TEXT",
        ColumnType::Int64 | ColumnType::Bool => "INTEGER",
        ColumnType::Bytes => "BLOB",
    }
}

/// Convert a ledger value into an owned SQLite value for binding
pub fn to_sql_value(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::String(s) => Value::Text(s.clone()),
        ColumnValue::Int64(i) => Value::Integer(*i),
        ColumnValue::Bool(b) => Value::Integer(i64::from(*b)),
        ColumnValue::Bytes(b) => Value::Blob(b.clone()),
    }
}

/// Read column `idx` of a result row as the declared ledger type
pub fn read_value(
    row: &rusqlite::Row<'_>,
    idx: usize,
    column_type: ColumnType,
) -> rusqlite::Result<ColumnValue> {
    Ok(match column_type {
        ColumnType::String => ColumnValue::String(row.get(idx)?),
        ColumnType::Int64 => ColumnValue::Int64(row.get(idx)?),
        ColumnType::Bool => ColumnValue::Bool(row.get(idx)?),
        ColumnType::Bytes => ColumnValue::Bytes(row.get(idx)?),
    })
}

/// Quote an identifier already restricted to `[A-Za-z0-9_]`
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Physical SQLite table backing a ledger table
pub fn physical_table(name: &str) -> String {
    quote_ident(&format!("lt_{}", name))
}

/// Serialize column definitions for the catalog
pub fn serialize_columns(columns: &[ColumnDefinition]) -> Result<String> {
    Ok(serde_json::to_string(columns)?)
}

/// Deserialize column definitions from the catalog
pub fn deserialize_columns(json: &str) -> Result<Vec<ColumnDefinition>> {
    Ok(serde_json::from_str(json)?)
}

/// Format a catalog timestamp (RFC3339)
pub fn timestamp_to_sql(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Parse a catalog timestamp (RFC3339)
pub fn sql_to_timestamp(datetime_str: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqliteError::Catalog(format!("Invalid datetime '{}': {}", datetime_str, e)))
}
