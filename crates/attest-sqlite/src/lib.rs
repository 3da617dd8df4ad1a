//! SQLite ledger-table host for the attestation record store
//!
//! Implements [`attest_core::LedgerTables`] on a local SQLite database so the
//! record service can run outside a ledger platform (CLI, integration tests,
//! single-node deployments).
//!
//! # Features
//!
//! - One SQLite table per ledger table, keyed by the composite primary key
//! - Table definitions kept in a catalog table, surviving reopen
//! - Duplicate keys reported as `Ok(false)` from the primary-key constraint
//! - In-memory databases for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use attest_core::{InvocationContext, RecordService};
//! use attest_sqlite::SqliteLedger;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = InvocationContext::new("tx-1");
//! let mut service = RecordService::new(SqliteLedger::open("ledger.db")?);
//! service.provision(&ctx)?;
//!
//! let quotes = service.quotes_by_hostname(&ctx, "host1").await?;
//! assert!(quotes.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod migrate;
pub mod store;
pub mod values;

// Re-export main types
pub use error::{Result, SqliteError};
pub use store::{SqliteLedger, TableInfo};
