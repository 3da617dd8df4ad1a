//! In-memory ledger-table backend
//!
//! A BTreeMap-based implementation for testing and development.
//! Not suitable for production use due to lack of persistence and replication.

use std::collections::{BTreeMap, HashMap};

use crate::row::{ColumnValue, Row};
use crate::schema::TableSchema;
use crate::storage::error::{TableError, TableResult};
use crate::storage::traits::{LedgerTables, RowStream};

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    /// Rows keyed by composite key, so prefix scans are contiguous ranges.
    rows: BTreeMap<Vec<ColumnValue>, Row>,
}

/// In-memory ledger tables.
///
/// Useful for:
/// - Unit testing
/// - Development/prototyping
/// - Short-lived processes that don't need persistence
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: HashMap<String, MemoryTable>,
}

impl MemoryLedger {
    /// Create a new ledger with no tables.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Number of rows in a table (for testing).
    pub fn row_count(&self, table: &str) -> TableResult<usize> {
        self.table(table).map(|t| t.rows.len())
    }

    fn table(&self, name: &str) -> TableResult<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::NotFound(name.to_string()))
    }
}

impl LedgerTables for MemoryLedger {
    fn create_table(&mut self, schema: &TableSchema) -> TableResult<()> {
        schema.validate()?;
        if self.tables.contains_key(&schema.name) {
            return Err(TableError::AlreadyExists(schema.name.clone()));
        }
        self.tables.insert(
            schema.name.clone(),
            MemoryTable {
                schema: schema.clone(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn delete_table(&mut self, name: &str) -> TableResult<()> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TableError::NotFound(name.to_string()))
    }

    fn insert_row(&mut self, table: &str, row: Row) -> TableResult<bool> {
        let table = self
            .tables
            .get_mut(table)
            .ok_or_else(|| TableError::NotFound(table.to_string()))?;
        table.schema.check_row(&row)?;

        let key = table.schema.key_of(&row);
        if table.rows.contains_key(&key) {
            return Ok(false);
        }
        table.rows.insert(key, row);
        Ok(true)
    }

    fn match_rows(&self, table: &str, prefix: &[ColumnValue]) -> TableResult<RowStream> {
        let memory_table = self.table(table)?;
        memory_table.schema.check_prefix(prefix)?;

        // Every key starting with `prefix` sorts at or after it.
        let matching = memory_table
            .rows
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, row)| row.clone())
            .collect();

        Ok(RowStream::from_rows(table, matching))
    }

    fn table_schema(&self, name: &str) -> TableResult<Option<TableSchema>> {
        Ok(self.tables.get(name).map(|t| t.schema.clone()))
    }

    fn table_names(&self) -> TableResult<Vec<String>> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
