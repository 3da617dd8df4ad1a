//! Attestation Record Store
//!
//! Keeps device-attestation quotes and the validators' verdicts on them as
//! append-only rows in two tables of a replicated ledger. The ledger platform
//! (consensus, persistence, replication) is reached only through the
//! [`LedgerTables`] trait.
//!
//! - **schema**: the `Quotes` and `Attestation` table definitions
//! - **registry**: provisioning and destructive reset of both tables
//! - **service**: insert-if-absent and key-prefix queries
//! - **dispatch**: function-name dispatch with positional arguments
//! - **storage**: the ledger-table host trait and an in-memory host
//!
//! # Example
//!
//! ```rust
//! use attest_core::{InvocationContext, MemoryLedger, RecordService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> attest_core::Result<()> {
//! let ctx = InvocationContext::new("tx-1");
//! let mut service = RecordService::new(MemoryLedger::new());
//!
//! let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
//! service.dispatch(&ctx, "provision", &[]).await?;
//! service
//!     .dispatch(&ctx, "insertQuote", &args(&["host1", "alice", "t1", "n1", "Q==", "E=="]))
//!     .await?;
//!
//! let payload = service
//!     .dispatch(&ctx, "queryQuotesByHostname", &args(&["host1"]))
//!     .await?
//!     .unwrap_or_default();
//! assert_eq!(
//!     String::from_utf8_lossy(&payload),
//!     r#"[{"columns":["host1","alice","t1","n1","Q==","E=="]}]"#
//! );
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod dispatch;
pub mod error;
pub mod records;
pub mod registry;
pub mod row;
pub mod schema;
pub mod service;
pub mod storage;

// Re-export main types at crate root
pub use context::InvocationContext;
pub use dispatch::{Operation, Response};
pub use error::{LedgerError, Result};
pub use records::{AttestationRecord, QuoteRecord};
pub use row::{decode_rows, ColumnValue, Row};
pub use schema::{ColumnDefinition, ColumnType, TableSchema, ATTESTATION_TABLE, QUOTES_TABLE};
pub use service::{encode_rows, RecordService};
pub use storage::{LedgerTables, MemoryLedger, RowSender, RowStream, TableError, TableResult};
