//! Query path
//!
//! Queries fix the leading key columns and leave the rest open. A later key
//! column can never be constrained without every column before it; filtering
//! verdicts by validator alone, say, needs a scan of the whole client prefix.

use tracing::{debug, Instrument};

use super::RecordService;
use crate::context::InvocationContext;
use crate::error::{LedgerError, Result};
use crate::records::{AttestationRecord, QuoteRecord};
use crate::row::{ColumnValue, Row};
use crate::schema::{ATTESTATION_TABLE, QUOTES_TABLE};
use crate::storage::{LedgerTables, TableError};

impl<L: LedgerTables> RecordService<L> {
    /// All rows of `table` whose leading key columns equal `prefix`.
    ///
    /// The host's row stream is drained to its close signal before returning.
    /// A failure to start the scan fails the whole query.
    pub async fn match_prefix(
        &self,
        ctx: &InvocationContext,
        table: &str,
        prefix: &[ColumnValue],
    ) -> Result<Vec<Row>> {
        async {
            debug!(table, prefix_len = prefix.len(), "matching rows");
            let stream = self.ledger.match_rows(table, prefix)?;
            let rows = stream.drain().await;
            debug!(table, rows = rows.len(), "rows matched");
            Ok::<_, LedgerError>(rows)
        }
        .instrument(ctx.span().clone())
        .await
    }

    /// Serialized quotes submitted by `hostname`.
    pub async fn query_quotes_by_hostname(
        &self,
        ctx: &InvocationContext,
        hostname: &str,
    ) -> Result<Vec<u8>> {
        let rows = self
            .match_prefix(ctx, QUOTES_TABLE, &[ColumnValue::from(hostname)])
            .await?;
        encode_rows(&rows)
    }

    /// Serialized verdicts on `client_hostname` issued by `validator_hostname`.
    pub async fn query_client_attested_by(
        &self,
        ctx: &InvocationContext,
        client_hostname: &str,
        validator_hostname: &str,
    ) -> Result<Vec<u8>> {
        let prefix = [
            ColumnValue::from(client_hostname),
            ColumnValue::from(validator_hostname),
        ];
        let rows = self.match_prefix(ctx, ATTESTATION_TABLE, &prefix).await?;
        encode_rows(&rows)
    }

    /// Serialized verdicts on `client_hostname` from any validator.
    pub async fn query_attestations_by_client(
        &self,
        ctx: &InvocationContext,
        client_hostname: &str,
    ) -> Result<Vec<u8>> {
        let rows = self
            .match_prefix(ctx, ATTESTATION_TABLE, &[ColumnValue::from(client_hostname)])
            .await?;
        encode_rows(&rows)
    }

    /// Typed variant of [`Self::query_quotes_by_hostname`].
    pub async fn quotes_by_hostname(
        &self,
        ctx: &InvocationContext,
        hostname: &str,
    ) -> Result<Vec<QuoteRecord>> {
        let rows = self
            .match_prefix(ctx, QUOTES_TABLE, &[ColumnValue::from(hostname)])
            .await?;
        decode_records(rows)
    }

    /// Typed variant of [`Self::query_attestations_by_client`].
    pub async fn attestations_by_client(
        &self,
        ctx: &InvocationContext,
        client_hostname: &str,
    ) -> Result<Vec<AttestationRecord>> {
        let rows = self
            .match_prefix(ctx, ATTESTATION_TABLE, &[ColumnValue::from(client_hostname)])
            .await?;
        decode_records(rows)
    }

    /// The quote a verdict refers to, if it is still stored.
    pub async fn quote_for(
        &self,
        ctx: &InvocationContext,
        attestation: &AttestationRecord,
    ) -> Result<Option<QuoteRecord>> {
        let rows = self
            .match_prefix(ctx, QUOTES_TABLE, &attestation.quote_prefix())
            .await?;
        let quotes: Vec<QuoteRecord> = decode_records(rows)?;
        Ok(quotes.into_iter().find(|q| attestation.refers_to(q)))
    }
}

/// Encode rows as the single query response payload.
pub fn encode_rows(rows: &[Row]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(rows)?)
}

fn decode_records<T>(rows: Vec<Row>) -> Result<Vec<T>>
where
    T: TryFrom<Row, Error = TableError>,
{
    Ok(rows
        .into_iter()
        .map(T::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::decode_rows;
    use crate::storage::MemoryLedger;

    fn provisioned() -> (InvocationContext, RecordService<MemoryLedger>) {
        let ctx = InvocationContext::new("tx-test");
        let mut service = RecordService::new(MemoryLedger::new());
        service.provision(&ctx).unwrap();
        (ctx, service)
    }

    fn verdict(client: &str, validator: &str, timestamp: &str) -> AttestationRecord {
        AttestationRecord {
            client_hostname: client.to_string(),
            validator_hostname: validator.to_string(),
            timestamp: timestamp.to_string(),
            quote_timestamp: "t1".to_string(),
            quote_nonce: "n1".to_string(),
            is_valid: "true".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_array() {
        let (ctx, service) = provisioned();
        let payload = service.query_quotes_by_hostname(&ctx, "nobody").await.unwrap();
        assert_eq!(payload, b"[]");
    }

    #[tokio::test]
    async fn test_query_without_table_is_storage_error() {
        let ctx = InvocationContext::new("tx-test");
        let service = RecordService::new(MemoryLedger::new());
        let err = service
            .query_attestations_by_client(&ctx, "host1")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(TableError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_client_attested_by_two_column_prefix() {
        let (ctx, mut service) = provisioned();
        service
            .insert_attestation(&ctx, verdict("host1", "validator1", "t2"))
            .unwrap();
        service
            .insert_attestation(&ctx, verdict("host1", "validator1", "t3"))
            .unwrap();
        service
            .insert_attestation(&ctx, verdict("host1", "validator2", "t2"))
            .unwrap();
        service
            .insert_attestation(&ctx, verdict("host2", "validator1", "t2"))
            .unwrap();

        let payload = service
            .query_client_attested_by(&ctx, "host1", "validator1")
            .await
            .unwrap();
        let rows = decode_rows(&payload).unwrap();
        assert_eq!(rows.len(), 2);

        let by_client = service.attestations_by_client(&ctx, "host1").await.unwrap();
        assert_eq!(by_client.len(), 3);
        assert!(by_client.iter().all(|a| a.client_hostname == "host1"));
    }

    #[tokio::test]
    async fn test_quote_for_follows_back_reference() {
        let (ctx, mut service) = provisioned();
        let quote = QuoteRecord {
            hostname: "host1".to_string(),
            userid: "alice".to_string(),
            timestamp: "t1".to_string(),
            nonce: "n1".to_string(),
            quote: "Q==".to_string(),
            eventlog: "E==".to_string(),
        };
        service.insert_quote(&ctx, quote.clone()).unwrap();

        let found = service
            .quote_for(&ctx, &verdict("host1", "validator1", "t2"))
            .await
            .unwrap();
        assert_eq!(found, Some(quote));

        let dangling = service
            .quote_for(&ctx, &verdict("host9", "validator1", "t2"))
            .await
            .unwrap();
        assert_eq!(dangling, None);
    }
}
