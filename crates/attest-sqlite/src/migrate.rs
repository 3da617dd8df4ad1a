//! Database migration runner
//!
//! Creates the bookkeeping tables the host needs before any ledger table can be
//! created: the migration log and the table catalog.

use rusqlite::Connection;

use crate::error::{Result, SqliteError};

/// Name of the catalog table holding ledger table definitions.
pub const CATALOG_TABLE: &str = "ledger_tables";

/// Name of the migration log table.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "000",
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at DATETIME NOT NULL
        );",
    ),
    (
        "001",
        "CREATE TABLE ledger_tables (
            name TEXT PRIMARY KEY,
            columns TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    ),
];

/// Apply all pending migrations to the database
///
/// Creates the schema_migrations table if it doesn't exist,
/// then applies any migrations that haven't been applied yet.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub fn migrate(conn: &Connection) -> Result<()> {
    for (version, sql) in MIGRATIONS {
        apply_migration(conn, version, sql)
            .map_err(|e| SqliteError::Migration(format!("{version}: {e}")))?;
    }
    Ok(())
}

/// Apply a single migration if it hasn't been applied yet
fn apply_migration(conn: &Connection, version: &str, sql: &str) -> Result<()> {
    if is_migration_applied(conn, version)? {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    record_migration(&tx, version)?;
    tx.commit()?;

    tracing::debug!(version, "applied migration");
    Ok(())
}

/// Check if a migration has already been applied
fn is_migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let table_exists: bool = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;

    if !table_exists {
        return Ok(false);
    }

    let exists = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?")?
        .exists([version])?;

    Ok(exists)
}

/// Record that a migration has been applied
fn record_migration(conn: &Connection, version: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?, CURRENT_TIMESTAMP)",
        [version],
    )?;
    Ok(())
}
