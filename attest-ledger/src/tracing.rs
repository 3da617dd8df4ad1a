//! Logging setup for the ledger harness

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with a default filter.
///
/// RUST_LOG overrides `default_filter` when set. Output goes to stderr so that
/// stdout carries nothing but query payloads.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
