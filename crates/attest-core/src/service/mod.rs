//! Record service: insert-time uniqueness and prefix queries
//!
//! `RecordService` owns a ledger-table host and translates each operation into
//! a single host primitive call.
//!
//! # Example
//!
//! ```rust
//! use attest_core::{InvocationContext, MemoryLedger, QuoteRecord, RecordService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> attest_core::Result<()> {
//! let ctx = InvocationContext::new("tx-1");
//! let mut service = RecordService::new(MemoryLedger::new());
//! service.provision(&ctx)?;
//!
//! service.insert_quote(&ctx, QuoteRecord {
//!     hostname: "host1".into(),
//!     userid: "alice".into(),
//!     timestamp: "t1".into(),
//!     nonce: "n1".into(),
//!     quote: "Q==".into(),
//!     eventlog: "E==".into(),
//! })?;
//!
//! let quotes = service.quotes_by_hostname(&ctx, "host1").await?;
//! assert_eq!(quotes.len(), 1);
//! # Ok(())
//! # }
//! ```

mod insert;
mod query;

pub use query::encode_rows;

use crate::context::InvocationContext;
use crate::error::Result;
use crate::registry;
use crate::storage::LedgerTables;

/// Attestation record store over a ledger-table host.
#[derive(Debug, Default)]
pub struct RecordService<L> {
    ledger: L,
}

impl<L: LedgerTables> RecordService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Get a reference to the underlying ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_inner(self) -> L {
        self.ledger
    }

    /// Create both tables. See [`registry::provision`].
    pub fn provision(&mut self, ctx: &InvocationContext) -> Result<()> {
        let _entered = ctx.span().enter();
        tracing::debug!("provision called");
        registry::provision(&mut self.ledger)
    }

    /// Drop and recreate both tables. See [`registry::reset`].
    pub fn reset(&mut self, ctx: &InvocationContext) -> Result<()> {
        let _entered = ctx.span().enter();
        tracing::debug!("reset called");
        registry::reset(&mut self.ledger)
    }
}
