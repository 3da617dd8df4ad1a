//! SQLite ledger host implementing the LedgerTables trait

use attest_core::{
    ColumnValue, LedgerTables, Row, RowStream, TableError, TableResult, TableSchema,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::migrate::CATALOG_TABLE;
use crate::values::{
    deserialize_columns, physical_table, quote_ident, read_value, serialize_columns, sql_to_timestamp,
    sql_type, timestamp_to_sql, to_sql_value,
};

/// Catalog entry for one ledger table
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub schema: TableSchema,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed ledger tables
///
/// Each ledger table is a SQLite table whose primary key is the composite key,
/// so key collisions are detected by SQLite itself and prefix matches are
/// index range scans.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Create a new SQLite ledger from a connection
    ///
    /// The connection should already have migrations applied.
    /// Use [`crate::migrate::migrate`] to initialize a fresh database.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Create a new in-memory SQLite ledger (for testing)
    pub fn in_memory() -> crate::error::Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::migrate::migrate(&conn)?;
        Ok(Self::new(conn))
    }

    /// Create a new file-backed SQLite ledger
    pub fn open(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let conn = Connection::open(path)?;
        crate::migrate::migrate(&conn)?;
        Ok(Self::new(conn))
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Catalog entry for `name`
    pub fn table_info(&self, name: &str) -> crate::error::Result<Option<TableInfo>> {
        let entry: Option<(String, String)> = self
            .conn
            .query_row(
                &format!("SELECT columns, created_at FROM {CATALOG_TABLE} WHERE name = ?"),
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match entry {
            None => Ok(None),
            Some((columns, created_at)) => Ok(Some(TableInfo {
                schema: TableSchema::new(name, deserialize_columns(&columns)?),
                created_at: sql_to_timestamp(&created_at)?,
            })),
        }
    }

    /// Number of rows in a ledger table
    pub fn row_count(&self, name: &str) -> TableResult<usize> {
        self.require(name)?;
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", physical_table(name)),
                [],
                |row| row.get(0),
            )
            .map_err(|e| TableError::Backend(e.to_string()))?;
        Ok(count as usize)
    }

    fn require(&self, name: &str) -> TableResult<TableSchema> {
        self.table_info(name)?
            .map(|info| info.schema)
            .ok_or_else(|| TableError::NotFound(name.to_string()))
    }

    fn create_physical(&mut self, schema: &TableSchema) -> crate::error::Result<()> {
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("{} {} NOT NULL", quote_ident(&c.name), sql_type(c.column_type)))
            .collect();
        let key: Vec<String> = schema.key_columns().map(|c| quote_ident(&c.name)).collect();
        let ddl = format!(
            "CREATE TABLE {} ({}, PRIMARY KEY ({})) WITHOUT ROWID",
            physical_table(&schema.name),
            columns.join(", "),
            key.join(", ")
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch(&ddl)?;
        tx.execute(
            &format!("INSERT INTO {CATALOG_TABLE} (name, columns, created_at) VALUES (?1, ?2, ?3)"),
            params![
                schema.name,
                serialize_columns(&schema.columns)?,
                timestamp_to_sql(Utc::now())
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn drop_physical(&mut self, name: &str) -> crate::error::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE {}", physical_table(name)))?;
        tx.execute(&format!("DELETE FROM {CATALOG_TABLE} WHERE name = ?"), [name])?;
        tx.commit()?;
        Ok(())
    }

    fn select_prefix(
        &self,
        schema: &TableSchema,
        prefix: &[ColumnValue],
    ) -> crate::error::Result<Vec<Row>> {
        let columns: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let key: Vec<String> = schema.key_columns().map(|c| quote_ident(&c.name)).collect();

        let mut sql = format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            physical_table(&schema.name)
        );
        if !prefix.is_empty() {
            let conditions: Vec<String> = key
                .iter()
                .take(prefix.len())
                .enumerate()
                .map(|(i, column)| format!("{} = ?{}", column, i + 1))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&key.join(", "));

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let types: Vec<_> = schema.columns.iter().map(|c| c.column_type).collect();
        let rows = stmt
            .query_map(params_from_iter(prefix.iter().map(to_sql_value)), |row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, column_type)| read_value(row, idx, *column_type))
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map(Row::new)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl LedgerTables for SqliteLedger {
    fn create_table(&mut self, schema: &TableSchema) -> TableResult<()> {
        schema.validate()?;
        if self.table_info(&schema.name)?.is_some() {
            return Err(TableError::AlreadyExists(schema.name.clone()));
        }
        self.create_physical(schema)?;
        tracing::debug!(table = %schema.name, "created sqlite table");
        Ok(())
    }

    fn delete_table(&mut self, name: &str) -> TableResult<()> {
        self.require(name)?;
        self.drop_physical(name)?;
        tracing::debug!(table = name, "dropped sqlite table");
        Ok(())
    }

    fn insert_row(&mut self, table: &str, row: Row) -> TableResult<bool> {
        let schema = self.require(table)?;
        schema.check_row(&row)?;

        let columns: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            physical_table(table),
            columns.join(", "),
            placeholders.join(", ")
        );

        match self
            .conn
            .execute(&sql, params_from_iter(row.columns.iter().map(to_sql_value)))
        {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Ok(false)
            }
            Err(e) => Err(TableError::Backend(format!("SQLite: {}", e))),
        }
    }

    fn match_rows(&self, table: &str, prefix: &[ColumnValue]) -> TableResult<RowStream> {
        let schema = self.require(table)?;
        schema.check_prefix(prefix)?;
        let rows = self.select_prefix(&schema, prefix)?;
        Ok(RowStream::from_rows(table, rows))
    }

    fn table_schema(&self, name: &str) -> TableResult<Option<TableSchema>> {
        Ok(self.table_info(name)?.map(|info| info.schema))
    }

    fn table_names(&self) -> TableResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT name FROM {CATALOG_TABLE} ORDER BY name"))
            .map_err(|e| TableError::Backend(e.to_string()))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| TableError::Backend(e.to_string()))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()
            .map_err(|e| TableError::Backend(e.to_string()))?;

        Ok(names)
    }
}
