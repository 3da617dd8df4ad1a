//! Insert path

use tracing::debug;

use super::RecordService;
use crate::context::InvocationContext;
use crate::error::{LedgerError, Result};
use crate::records::{AttestationRecord, QuoteRecord};
use crate::row::Row;
use crate::schema::{ATTESTATION_TABLE, QUOTES_TABLE};
use crate::storage::LedgerTables;

impl<L: LedgerTables> RecordService<L> {
    /// Append a quote.
    ///
    /// Fails with `LedgerError::DuplicateRecord` if a quote with the same
    /// `(hostname, userid, timestamp, nonce)` exists, whatever its payload.
    pub fn insert_quote(&mut self, ctx: &InvocationContext, quote: QuoteRecord) -> Result<()> {
        let _entered = ctx.span().enter();
        debug!(?quote, "insert quote called");
        self.insert_unique(QUOTES_TABLE, quote.to_row(), "Quote already exists")
    }

    /// Append a validation verdict.
    ///
    /// Fails with `LedgerError::DuplicateRecord` on a repeated five-column key.
    pub fn insert_attestation(
        &mut self,
        ctx: &InvocationContext,
        attestation: AttestationRecord,
    ) -> Result<()> {
        let _entered = ctx.span().enter();
        debug!(?attestation, "insert attestation called");
        self.insert_unique(
            ATTESTATION_TABLE,
            attestation.to_row(),
            "Attestation already exists",
        )
    }

    fn insert_unique(&mut self, table: &str, row: Row, duplicate: &str) -> Result<()> {
        if self.ledger.insert_row(table, row)? {
            debug!(table, "row inserted");
            Ok(())
        } else {
            debug!(table, "key already present");
            Err(LedgerError::DuplicateRecord(duplicate.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryLedger, TableError};

    fn quote(nonce: &str, payload: &str) -> QuoteRecord {
        QuoteRecord {
            hostname: "host1".to_string(),
            userid: "alice".to_string(),
            timestamp: "t1".to_string(),
            nonce: nonce.to_string(),
            quote: payload.to_string(),
            eventlog: "E==".to_string(),
        }
    }

    fn provisioned() -> (InvocationContext, RecordService<MemoryLedger>) {
        let ctx = InvocationContext::new("tx-test");
        let mut service = RecordService::new(MemoryLedger::new());
        service.provision(&ctx).unwrap();
        (ctx, service)
    }

    #[test]
    fn test_insert_quote_duplicate_key() {
        let (ctx, mut service) = provisioned();
        service.insert_quote(&ctx, quote("n1", "Q==")).unwrap();

        // Different payload, same key
        let err = service.insert_quote(&ctx, quote("n1", "other")).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateRecord(ref m) if m == "Quote already exists"));
        assert_eq!(service.ledger().row_count(QUOTES_TABLE).unwrap(), 1);
    }

    #[test]
    fn test_insert_quote_distinct_nonce() {
        let (ctx, mut service) = provisioned();
        service.insert_quote(&ctx, quote("n1", "Q==")).unwrap();
        service.insert_quote(&ctx, quote("n2", "Q==")).unwrap();
        assert_eq!(service.ledger().row_count(QUOTES_TABLE).unwrap(), 2);
    }

    #[test]
    fn test_insert_attestation_duplicate_key() {
        let (ctx, mut service) = provisioned();
        let verdict = AttestationRecord {
            client_hostname: "host1".to_string(),
            validator_hostname: "validator1".to_string(),
            timestamp: "t2".to_string(),
            quote_timestamp: "t1".to_string(),
            quote_nonce: "n1".to_string(),
            is_valid: "true".to_string(),
        };
        service.insert_attestation(&ctx, verdict.clone()).unwrap();
        let err = service
            .insert_attestation(
                &ctx,
                AttestationRecord {
                    is_valid: "false".to_string(),
                    ..verdict
                },
            )
            .unwrap_err();
        assert!(
            matches!(err, LedgerError::DuplicateRecord(ref m) if m == "Attestation already exists")
        );
    }

    #[test]
    fn test_insert_without_tables_is_storage_error() {
        let ctx = InvocationContext::new("tx-test");
        let mut service = RecordService::new(MemoryLedger::new());
        let err = service.insert_quote(&ctx, quote("n1", "Q==")).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(TableError::NotFound(_))));
    }
}
