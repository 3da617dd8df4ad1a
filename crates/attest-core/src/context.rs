//! Per-transaction invocation context

use tracing::{info_span, Span};

/// Context handed to every operation by the host.
///
/// Carries the transaction id and the `tracing` span all of the operation's
/// logging is recorded under.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    tx_id: String,
    span: Span,
}

impl InvocationContext {
    /// Create a context with a fresh `tx` span.
    pub fn new(tx_id: impl Into<String>) -> Self {
        let tx_id = tx_id.into();
        let span = info_span!("tx", tx_id = %tx_id);
        Self { tx_id, span }
    }

    /// Create a context recording into a span owned by the host.
    pub fn with_span(tx_id: impl Into<String>, span: Span) -> Self {
        Self {
            tx_id: tx_id.into(),
            span,
        }
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
