//! Ledger-table trait and row sequence definitions

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::row::{ColumnValue, Row};
use crate::schema::TableSchema;
use crate::storage::error::TableResult;

/// The table primitives a ledger host must provide.
///
/// Every call is made from within one host transaction; the host serializes
/// transactions against a given ledger state, so implementations need no
/// internal locking of their own.
pub trait LedgerTables {
    /// Create a table.
    ///
    /// Returns `TableError::AlreadyExists` if a table with the same name exists.
    fn create_table(&mut self, schema: &TableSchema) -> TableResult<()>;

    /// Delete a table and every row in it.
    ///
    /// Returns `TableError::NotFound` if the table does not exist.
    fn delete_table(&mut self, name: &str) -> TableResult<()>;

    /// Insert a row unless a row with the same composite key exists.
    ///
    /// Returns `Ok(false)` on key collision, leaving the existing row untouched.
    /// The insert is atomic: either the whole row is appended or nothing is.
    fn insert_row(&mut self, table: &str, row: Row) -> TableResult<bool>;

    /// Start a scan of all rows whose leading key columns equal `prefix`.
    ///
    /// Only leading key columns can be constrained; an empty prefix matches the
    /// whole table.
    fn match_rows(&self, table: &str, prefix: &[ColumnValue]) -> TableResult<RowStream>;

    /// Look up a table definition.
    fn table_schema(&self, name: &str) -> TableResult<Option<TableSchema>>;

    /// Names of all tables, sorted.
    fn table_names(&self) -> TableResult<Vec<String>>;

    /// Check if a table exists.
    fn table_exists(&self, name: &str) -> TableResult<bool> {
        Ok(self.table_schema(name)?.is_some())
    }
}

/// Producer half of a [`RowStream`].
///
/// Dropping the last sender is the close signal.
#[derive(Debug, Clone)]
pub struct RowSender {
    tx: mpsc::UnboundedSender<Row>,
}

impl RowSender {
    /// Push one row. Returns `false` once the consumer has gone away.
    pub fn send(&self, row: Row) -> bool {
        self.tx.send(row).is_ok()
    }
}

/// Rows delivered by a host scan, one at a time, until the producer closes.
///
/// Consumers must drain the stream to the close signal. If it is dropped early
/// the channel is closed so the producer stops and its resources are released.
#[derive(Debug)]
pub struct RowStream {
    table: String,
    inner: UnboundedReceiverStream<Row>,
    received: usize,
    finished: bool,
}

impl RowStream {
    /// Create a connected sender and stream for `table`.
    pub fn channel(table: impl Into<String>) -> (RowSender, RowStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            RowSender { tx },
            RowStream {
                table: table.into(),
                inner: UnboundedReceiverStream::new(rx),
                received: 0,
                finished: false,
            },
        )
    }

    /// Build an already closed stream holding `rows`.
    pub fn from_rows(table: impl Into<String>, rows: Vec<Row>) -> RowStream {
        let (sender, stream) = Self::channel(table);
        for row in rows {
            sender.send(row);
        }
        stream
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rows received so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Whether the close signal has been observed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume every row until the close signal.
    pub async fn drain(mut self) -> Vec<Row> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row);
        }
        rows
    }
}

impl Stream for RowStream {
    type Item = Row;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Row>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(row)) => {
                this.received += 1;
                Poll::Ready(Some(row))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RowStream {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.close();
            debug!(
                table = %self.table,
                received = self.received,
                "row stream dropped before close signal"
            );
        }
    }
}
