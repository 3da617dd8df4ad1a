//! Operation dispatch by function name and positional string arguments
//!
//! The host delivers each transaction as a function name plus a list of string
//! arguments. Arity is checked before the ledger is touched.
//!
//! | Operation | Arity | Legacy name |
//! |---|---|---|
//! | `provision` | 0 | `init` |
//! | `reset` | 0 | `refreshatttables` |
//! | `insertQuote` | 6 | `quote` |
//! | `insertAttestation` | 6 | `attest` |
//! | `queryQuotesByHostname` | 1 | `quotes_by_hostname` |
//! | `queryClientAttestedBy` | 2 | `client_attested_by` |
//! | `queryAttestationsByClient` | 1 | `attestations_by_client` |

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::context::InvocationContext;
use crate::error::{LedgerError, Result};
use crate::records::{AttestationRecord, QuoteRecord};
use crate::service::RecordService;
use crate::storage::LedgerTables;

/// Payload returned to the submitter; `None` for operations that carry no data.
pub type Response = Option<Vec<u8>>;

/// The operations exposed to transaction submitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Provision,
    Reset,
    InsertQuote,
    InsertAttestation,
    QueryQuotesByHostname,
    QueryClientAttestedBy,
    QueryAttestationsByClient,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Provision,
        Operation::Reset,
        Operation::InsertQuote,
        Operation::InsertAttestation,
        Operation::QueryQuotesByHostname,
        Operation::QueryClientAttestedBy,
        Operation::QueryAttestationsByClient,
    ];

    /// Canonical function name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Provision => "provision",
            Operation::Reset => "reset",
            Operation::InsertQuote => "insertQuote",
            Operation::InsertAttestation => "insertAttestation",
            Operation::QueryQuotesByHostname => "queryQuotesByHostname",
            Operation::QueryClientAttestedBy => "queryClientAttestedBy",
            Operation::QueryAttestationsByClient => "queryAttestationsByClient",
        }
    }

    /// Name used by earlier deployments of the contract.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Operation::Provision => "init",
            Operation::Reset => "refreshatttables",
            Operation::InsertQuote => "quote",
            Operation::InsertAttestation => "attest",
            Operation::QueryQuotesByHostname => "quotes_by_hostname",
            Operation::QueryClientAttestedBy => "client_attested_by",
            Operation::QueryAttestationsByClient => "attestations_by_client",
        }
    }

    /// Exact number of positional arguments.
    pub fn arity(self) -> usize {
        match self {
            Operation::Provision | Operation::Reset => 0,
            Operation::InsertQuote | Operation::InsertAttestation => 6,
            Operation::QueryQuotesByHostname | Operation::QueryAttestationsByClient => 1,
            Operation::QueryClientAttestedBy => 2,
        }
    }

    /// Whether the operation only reads the ledger.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Operation::QueryQuotesByHostname
                | Operation::QueryClientAttestedBy
                | Operation::QueryAttestationsByClient
        )
    }

    pub fn arity_error(self, actual: usize) -> LedgerError {
        LedgerError::Arity {
            operation: self.name().to_string(),
            expected: self.arity(),
            actual,
        }
    }

    pub fn check_arity(self, args: &[String]) -> Result<()> {
        if args.len() == self.arity() {
            Ok(())
        } else {
            Err(self.arity_error(args.len()))
        }
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s || op.legacy_name() == s)
            .ok_or_else(|| LedgerError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<L: LedgerTables> RecordService<L> {
    /// Run any operation by name.
    pub async fn dispatch(
        &mut self,
        ctx: &InvocationContext,
        function: &str,
        args: &[String],
    ) -> Result<Response> {
        let operation: Operation = function.parse()?;
        self.run(ctx, operation, args).await
    }

    /// Run a mutating operation; query names are rejected.
    pub async fn invoke(
        &mut self,
        ctx: &InvocationContext,
        function: &str,
        args: &[String],
    ) -> Result<Response> {
        let operation: Operation = function.parse()?;
        if operation.is_query() {
            return Err(LedgerError::UnknownOperation(function.to_string()));
        }
        self.run(ctx, operation, args).await
    }

    /// Run a read-only operation; mutating names are rejected.
    pub async fn query(
        &self,
        ctx: &InvocationContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>> {
        let operation: Operation = function.parse()?;
        if !operation.is_query() {
            return Err(LedgerError::UnknownOperation(function.to_string()));
        }
        operation.check_arity(args)?;
        self.run_query(ctx, operation, args).await
    }

    async fn run(
        &mut self,
        ctx: &InvocationContext,
        operation: Operation,
        args: &[String],
    ) -> Result<Response> {
        debug!(parent: ctx.span(), %operation, ?args, "dispatching");
        operation.check_arity(args)?;

        match operation {
            Operation::Provision => self.provision(ctx).map(|_| None),
            Operation::Reset => self.reset(ctx).map(|_| None),
            Operation::InsertQuote => {
                let quote = QuoteRecord::from_args(args)?;
                self.insert_quote(ctx, quote).map(|_| None)
            }
            Operation::InsertAttestation => {
                let attestation = AttestationRecord::from_args(args)?;
                self.insert_attestation(ctx, attestation).map(|_| None)
            }
            _ => self.run_query(ctx, operation, args).await.map(Some),
        }
    }

    async fn run_query(
        &self,
        ctx: &InvocationContext,
        operation: Operation,
        args: &[String],
    ) -> Result<Vec<u8>> {
        match (operation, args) {
            (Operation::QueryQuotesByHostname, [hostname]) => {
                self.query_quotes_by_hostname(ctx, hostname).await
            }
            (Operation::QueryClientAttestedBy, [client, validator]) => {
                self.query_client_attested_by(ctx, client, validator).await
            }
            (Operation::QueryAttestationsByClient, [client]) => {
                self.query_attestations_by_client(ctx, client).await
            }
            (Operation::QueryQuotesByHostname, _)
            | (Operation::QueryClientAttestedBy, _)
            | (Operation::QueryAttestationsByClient, _) => {
                Err(operation.arity_error(args.len()))
            }
            _ => Err(LedgerError::UnknownOperation(operation.name().to_string())),
        }
    }
}
