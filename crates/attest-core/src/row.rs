//! Column values and rows as exchanged with the ledger host

use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

/// A single typed column value.
///
/// Serializes untagged, so a string column is a plain JSON string in query
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    String(String),
    Int64(i64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl ColumnValue {
    /// The column type this value satisfies.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValue::String(_) => ColumnType::String,
            ColumnValue::Int64(_) => ColumnType::Int64,
            ColumnValue::Bool(_) => ColumnType::Bool,
            ColumnValue::Bytes(_) => ColumnType::Bytes,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::String(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::String(value.to_string())
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Int64(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Bool(value)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        ColumnValue::Bytes(value)
    }
}

/// One table row, column values in schema-declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<ColumnValue>,
}

impl Row {
    pub fn new(columns: Vec<ColumnValue>) -> Self {
        Self { columns }
    }

    /// Build a row of string columns.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: values
                .into_iter()
                .map(|v| ColumnValue::String(v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Decode a serialized query payload back into rows.
pub fn decode_rows(payload: &[u8]) -> serde_json::Result<Vec<Row>> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_row_serializes_as_plain_strings() {
        let row = Row::from_strings(["host1", "alice"]);
        let json = serde_json::to_string(&vec![row]).unwrap();
        assert_eq!(json, r#"[{"columns":["host1","alice"]}]"#);
    }

    #[test]
    fn test_decode_mixed_values() {
        let rows = decode_rows(br#"[{"columns":["a",7,true,[1,2]]}]"#).unwrap();
        assert_eq!(
            rows[0].columns,
            vec![
                ColumnValue::from("a"),
                ColumnValue::Int64(7),
                ColumnValue::Bool(true),
                ColumnValue::Bytes(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(decode_rows(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_key_ordering_is_lexicographic() {
        let a = vec![ColumnValue::from("host1"), ColumnValue::from("b")];
        let b = vec![ColumnValue::from("host1")];
        assert!(b < a);
    }
}
