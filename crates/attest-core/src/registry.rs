//! Schema registry: creates and tears down the two attestation tables
//!
//! Creating both tables is not transactional. If the `Attestation` create
//! fails after `Quotes` was created, `Quotes` is left in place and the error is
//! returned; a later `reset` clears the half-provisioned state.

use tracing::{debug, info, warn};

use crate::error::{LedgerError, Result};
use crate::schema::{attestation_schema, quotes_schema, TableSchema, ATTESTATION_TABLE, QUOTES_TABLE};
use crate::storage::{LedgerTables, TableError};

/// The table definitions this store owns, in creation order.
pub fn schemas() -> [TableSchema; 2] {
    [quotes_schema(), attestation_schema()]
}

/// Create `Quotes` then `Attestation`.
///
/// Stops at the first failure without undoing earlier creates.
pub fn provision<L: LedgerTables + ?Sized>(ledger: &mut L) -> Result<()> {
    for schema in schemas() {
        create_table(ledger, &schema)?;
    }
    info!("attestation tables provisioned");
    Ok(())
}

/// Drop both tables, ignoring deletion failures, then [`provision`].
///
/// Destroys every stored quote and verdict.
pub fn reset<L: LedgerTables + ?Sized>(ledger: &mut L) -> Result<()> {
    for name in [QUOTES_TABLE, ATTESTATION_TABLE] {
        match ledger.delete_table(name) {
            Ok(()) => debug!(table = name, "deleted table"),
            Err(TableError::NotFound(_)) => debug!(table = name, "table absent, nothing to delete"),
            Err(e) => warn!(table = name, error = %e, "failed to delete table"),
        }
    }
    provision(ledger)
}

fn create_table<L: LedgerTables + ?Sized>(ledger: &mut L, schema: &TableSchema) -> Result<()> {
    debug!(table = %schema.name, "creating table");
    ledger
        .create_table(schema)
        .map_err(|source| LedgerError::Schema {
            table: schema.name.clone(),
            source,
        })?;
    debug!(table = %schema.name, "created table");
    Ok(())
}
