//! Ledger-table host abstraction
//!
//! The ledger platform owns persistence, replication and isolation. This module
//! defines the four primitives the record store needs from it as the
//! `LedgerTables` trait. Implementations exist for:
//!
//! - **Memory**: In-memory tables for testing and development (`MemoryLedger`)
//! - **SQLite**: Native SQLite via rusqlite (separate crate, `attest-sqlite`)
//!
//! # Example
//!
//! ```rust
//! use attest_core::row::Row;
//! use attest_core::schema::{quotes_schema, QUOTES_TABLE};
//! use attest_core::storage::{LedgerTables, MemoryLedger};
//!
//! let mut ledger = MemoryLedger::new();
//! ledger.create_table(&quotes_schema()).unwrap();
//!
//! let row = Row::from_strings(["host1", "alice", "t1", "n1", "Q==", "E=="]);
//! assert!(ledger.insert_row(QUOTES_TABLE, row.clone()).unwrap());
//! assert!(!ledger.insert_row(QUOTES_TABLE, row).unwrap());
//! ```

mod error;
mod memory;
mod traits;

pub use error::{TableError, TableResult};
pub use memory::MemoryLedger;
pub use traits::{LedgerTables, RowSender, RowStream};
