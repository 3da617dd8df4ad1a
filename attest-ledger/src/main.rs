mod tracing;

use std::path::PathBuf;

use ::tracing::{debug, info, warn};
use attest_core::{InvocationContext, LedgerTables, RecordService};
use attest_sqlite::SqliteLedger;
use chrono::Utc;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "attest-ledger")]
#[command(about = "Run one attestation record store operation against a SQLite ledger")]
#[command(version)]
struct Args {
    /// SQLite database file (a throwaway in-memory ledger when omitted)
    #[arg(long, env = "ATTEST_LEDGER_DB")]
    db: Option<PathBuf>,

    /// Log level (debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Transaction id attached to every log line of the invocation
    #[arg(long)]
    tx_id: Option<String>,

    /// Print the table catalog and exit
    #[arg(long)]
    list_tables: bool,

    /// Pretty-print query payloads
    #[arg(long)]
    pretty: bool,

    /// Operation name (e.g. provision, insertQuote, queryQuotesByHostname)
    #[arg(required_unless_present = "list_tables")]
    operation: Option<String>,

    /// Positional arguments of the operation
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Args {
    fn tx_id(&self) -> String {
        self.tx_id.clone().unwrap_or_else(|| {
            format!(
                "tx-{}-{}",
                std::process::id(),
                Utc::now().timestamp_millis()
            )
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    crate::tracing::init_with_filter(&args.log_level);

    let ledger = match &args.db {
        Some(path) => {
            debug!(path = %path.display(), "opening ledger");
            SqliteLedger::open(path)?
        }
        None => {
            warn!("no --db given; using an in-memory ledger discarded on exit");
            SqliteLedger::in_memory()?
        }
    };

    if args.list_tables {
        list_tables(&ledger)?;
        return Ok(());
    }

    let operation = args.operation.as_deref().ok_or("missing operation name")?;
    let ctx = InvocationContext::new(args.tx_id());
    let mut service = RecordService::new(ledger);

    let response = service.dispatch(&ctx, operation, &args.args).await?;
    info!(tx_id = ctx.tx_id(), operation, "operation committed");

    if let Some(payload) = response {
        if args.pretty {
            let value: serde_json::Value = serde_json::from_slice(&payload)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", String::from_utf8_lossy(&payload));
        }
    }

    Ok(())
}

fn list_tables(ledger: &SqliteLedger) -> Result<(), Box<dyn std::error::Error>> {
    for name in ledger.table_names()? {
        let Some(table) = ledger.table_info(&name)? else {
            continue;
        };
        let key_len = table.schema.key_len();
        println!(
            "{}\tkey={}\tcolumns={}\tcreated={}",
            name,
            key_len,
            table.schema.column_names().join(","),
            table.created_at.to_rfc3339()
        );
    }
    Ok(())
}
