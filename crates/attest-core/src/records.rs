//! Typed views of the two attestation tables
//!
//! Records are append-only: once a key is present it is never updated or
//! deleted, except by dropping the whole table.

use serde::{Deserialize, Serialize};

use crate::dispatch::Operation;
use crate::error::Result;
use crate::row::{ColumnValue, Row};
use crate::storage::TableError;

/// A quote submitted by a client host.
///
/// Keyed by `(hostname, userid, timestamp, nonce)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub hostname: String,
    pub userid: String,
    /// Caller-supplied ordering token, never interpreted
    pub timestamp: String,
    /// Anti-replay token
    pub nonce: String,
    /// Opaque signed quote
    pub quote: String,
    /// Opaque boot/measurement log
    pub eventlog: String,
}

impl QuoteRecord {
    /// Build from the positional `insertQuote` arguments.
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [hostname, userid, timestamp, nonce, quote, eventlog] => Ok(Self {
                hostname: hostname.clone(),
                userid: userid.clone(),
                timestamp: timestamp.clone(),
                nonce: nonce.clone(),
                quote: quote.clone(),
                eventlog: eventlog.clone(),
            }),
            _ => Err(Operation::InsertQuote.arity_error(args.len())),
        }
    }

    pub fn key(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::from(self.hostname.as_str()),
            ColumnValue::from(self.userid.as_str()),
            ColumnValue::from(self.timestamp.as_str()),
            ColumnValue::from(self.nonce.as_str()),
        ]
    }

    pub fn to_row(&self) -> Row {
        Row::from_strings([
            self.hostname.as_str(),
            self.userid.as_str(),
            self.timestamp.as_str(),
            self.nonce.as_str(),
            self.quote.as_str(),
            self.eventlog.as_str(),
        ])
    }
}

impl TryFrom<Row> for QuoteRecord {
    type Error = TableError;

    fn try_from(row: Row) -> std::result::Result<Self, Self::Error> {
        let [hostname, userid, timestamp, nonce, quote, eventlog] = string_columns::<6>(row)?;
        Ok(Self {
            hostname,
            userid,
            timestamp,
            nonce,
            quote,
            eventlog,
        })
    }
}

/// A validator's verdict on a previously submitted quote.
///
/// Keyed by `(client_hostname, validator_hostname, timestamp, quote_timestamp,
/// quote_nonce)`. The last two fields together with `client_hostname` name the
/// judged quote; the store never checks that it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub client_hostname: String,
    pub validator_hostname: String,
    /// Time of the validation event
    pub timestamp: String,
    pub quote_timestamp: String,
    pub quote_nonce: String,
    /// Verdict, encoded by the caller
    pub is_valid: String,
}

impl AttestationRecord {
    /// Build from the positional `insertAttestation` arguments.
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [client_hostname, validator_hostname, timestamp, quote_timestamp, quote_nonce, is_valid] => {
                Ok(Self {
                    client_hostname: client_hostname.clone(),
                    validator_hostname: validator_hostname.clone(),
                    timestamp: timestamp.clone(),
                    quote_timestamp: quote_timestamp.clone(),
                    quote_nonce: quote_nonce.clone(),
                    is_valid: is_valid.clone(),
                })
            }
            _ => Err(Operation::InsertAttestation.arity_error(args.len())),
        }
    }

    pub fn key(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::from(self.client_hostname.as_str()),
            ColumnValue::from(self.validator_hostname.as_str()),
            ColumnValue::from(self.timestamp.as_str()),
            ColumnValue::from(self.quote_timestamp.as_str()),
            ColumnValue::from(self.quote_nonce.as_str()),
        ]
    }

    /// Key prefix of the `Quotes` rows this verdict refers to.
    ///
    /// The quote's `userid` is not recorded, so the prefix stops at `hostname`;
    /// callers filter the result on `timestamp` and `nonce`.
    pub fn quote_prefix(&self) -> Vec<ColumnValue> {
        vec![ColumnValue::from(self.client_hostname.as_str())]
    }

    /// Whether `quote` is the quote this verdict judged.
    pub fn refers_to(&self, quote: &QuoteRecord) -> bool {
        quote.hostname == self.client_hostname
            && quote.timestamp == self.quote_timestamp
            && quote.nonce == self.quote_nonce
    }

    pub fn to_row(&self) -> Row {
        Row::from_strings([
            self.client_hostname.as_str(),
            self.validator_hostname.as_str(),
            self.timestamp.as_str(),
            self.quote_timestamp.as_str(),
            self.quote_nonce.as_str(),
            self.is_valid.as_str(),
        ])
    }
}

impl TryFrom<Row> for AttestationRecord {
    type Error = TableError;

    fn try_from(row: Row) -> std::result::Result<Self, Self::Error> {
        let [client_hostname, validator_hostname, timestamp, quote_timestamp, quote_nonce, is_valid] =
            string_columns::<6>(row)?;
        Ok(Self {
            client_hostname,
            validator_hostname,
            timestamp,
            quote_timestamp,
            quote_nonce,
            is_valid,
        })
    }
}

fn string_columns<const N: usize>(row: Row) -> std::result::Result<[String; N], TableError> {
    let len = row.len();
    let strings: Vec<String> = row
        .columns
        .into_iter()
        .map(|value| match value {
            ColumnValue::String(s) => Ok(s),
            other => Err(TableError::InvalidRow(format!(
                "expected string column, got {:?}",
                other.column_type()
            ))),
        })
        .collect::<std::result::Result<_, _>>()?;
    strings
        .try_into()
        .map_err(|_| TableError::InvalidRow(format!("expected {N} columns, got {len}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_from_args() {
        let quote =
            QuoteRecord::from_args(&args(&["host1", "alice", "t1", "n1", "Q==", "E=="])).unwrap();
        assert_eq!(quote.hostname, "host1");
        assert_eq!(quote.eventlog, "E==");
        assert_eq!(quote.key().len(), 4);
    }

    #[test]
    fn test_quote_from_args_wrong_arity() {
        let result = QuoteRecord::from_args(&args(&["host1"]));
        assert!(matches!(
            result,
            Err(LedgerError::Arity {
                expected: 6,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_quote_row_conversion() {
        let quote =
            QuoteRecord::from_args(&args(&["host1", "alice", "t1", "n1", "Q==", "E=="])).unwrap();
        let back = QuoteRecord::try_from(quote.to_row()).unwrap();
        assert_eq!(back, quote);
    }

    #[test]
    fn test_attestation_from_short_row() {
        let result = AttestationRecord::try_from(Row::from_strings(["a", "b"]));
        assert!(matches!(result, Err(TableError::InvalidRow(_))));
    }

    #[test]
    fn test_attestation_from_non_string_row() {
        let mut row = Row::from_strings(["a", "b", "c", "d", "e", "f"]);
        row.columns[5] = ColumnValue::Bool(true);
        assert!(AttestationRecord::try_from(row).is_err());
    }

    #[test]
    fn test_attestation_refers_to_quote() {
        let quote =
            QuoteRecord::from_args(&args(&["host1", "alice", "t1", "n1", "Q==", "E=="])).unwrap();
        let verdict = AttestationRecord::from_args(&args(&[
            "host1",
            "validator1",
            "t2",
            "t1",
            "n1",
            "true",
        ]))
        .unwrap();
        assert!(verdict.refers_to(&quote));
        assert_eq!(verdict.quote_prefix(), vec![ColumnValue::from("host1")]);

        let other = AttestationRecord {
            quote_nonce: "n2".to_string(),
            ..verdict
        };
        assert!(!other.refers_to(&quote));
    }
}
