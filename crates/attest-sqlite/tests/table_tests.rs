//! Ledger-table operation tests for SqliteLedger

use attest_core::schema::{attestation_schema, quotes_schema};
use attest_core::{
    ColumnDefinition, ColumnType, ColumnValue, LedgerTables, Row, TableError, TableSchema,
    ATTESTATION_TABLE, QUOTES_TABLE,
};
use attest_sqlite::SqliteLedger;
use pretty_assertions::assert_eq;

fn quote_row(hostname: &str, userid: &str, timestamp: &str, nonce: &str) -> Row {
    Row::from_strings([hostname, userid, timestamp, nonce, "Q==", "E=="])
}

async fn scan(ledger: &SqliteLedger, table: &str, prefix: &[&str]) -> Vec<Row> {
    let prefix: Vec<ColumnValue> = prefix.iter().map(|s| ColumnValue::from(*s)).collect();
    ledger.match_rows(table, &prefix).unwrap().drain().await
}

#[test]
fn test_create_and_list_tables() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();
    ledger.create_table(&attestation_schema()).unwrap();

    assert_eq!(
        ledger.table_names().unwrap(),
        vec![ATTESTATION_TABLE.to_string(), QUOTES_TABLE.to_string()]
    );
    assert_eq!(
        ledger.table_schema(QUOTES_TABLE).unwrap(),
        Some(quotes_schema())
    );
}

#[test]
fn test_create_existing_table_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();

    let err = ledger.create_table(&quotes_schema()).unwrap_err();
    assert_eq!(err, TableError::AlreadyExists(QUOTES_TABLE.to_string()));
}

#[test]
fn test_create_invalid_schema_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    let schema = TableSchema::new(
        "bad name",
        vec![ColumnDefinition::key("id", ColumnType::String)],
    );
    assert!(matches!(
        ledger.create_table(&schema),
        Err(TableError::InvalidSchema(_))
    ));
    assert!(ledger.table_names().unwrap().is_empty());
}

#[test]
fn test_delete_missing_table_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    let err = ledger.delete_table(QUOTES_TABLE).unwrap_err();
    assert_eq!(err, TableError::NotFound(QUOTES_TABLE.to_string()));
}

#[test]
fn test_delete_drops_rows() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();
    ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "alice", "t1", "n1"))
        .unwrap();

    ledger.delete_table(QUOTES_TABLE).unwrap();
    ledger.create_table(&quotes_schema()).unwrap();
    assert_eq!(ledger.row_count(QUOTES_TABLE).unwrap(), 0);
}

#[test]
fn test_insert_duplicate_key_returns_false() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();

    assert!(ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "alice", "t1", "n1"))
        .unwrap());

    let mut second = quote_row("host1", "alice", "t1", "n1");
    second.columns[4] = ColumnValue::from("different");
    assert!(!ledger.insert_row(QUOTES_TABLE, second).unwrap());
    assert_eq!(ledger.row_count(QUOTES_TABLE).unwrap(), 1);
}

#[test]
fn test_insert_into_missing_table_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    let err = ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "alice", "t1", "n1"))
        .unwrap_err();
    assert_eq!(err, TableError::NotFound(QUOTES_TABLE.to_string()));
}

#[test]
fn test_insert_wrong_shape_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();

    let short = Row::from_strings(["host1", "alice"]);
    assert!(matches!(
        ledger.insert_row(QUOTES_TABLE, short),
        Err(TableError::InvalidRow(_))
    ));

    let mut typed = quote_row("host1", "alice", "t1", "n1");
    typed.columns[2] = ColumnValue::Int64(7);
    assert!(matches!(
        ledger.insert_row(QUOTES_TABLE, typed),
        Err(TableError::InvalidRow(_))
    ));
}

#[tokio::test]
async fn test_prefix_is_exact_per_column() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();
    for hostname in ["host", "host1", "host10", "host2"] {
        ledger
            .insert_row(QUOTES_TABLE, quote_row(hostname, "alice", "t1", "n1"))
            .unwrap();
    }
    ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "bob", "t1", "n1"))
        .unwrap();

    let rows = scan(&ledger, QUOTES_TABLE, &["host1"]).await;
    assert_eq!(
        rows,
        vec![
            quote_row("host1", "alice", "t1", "n1"),
            quote_row("host1", "bob", "t1", "n1"),
        ]
    );

    assert_eq!(scan(&ledger, QUOTES_TABLE, &["host3"]).await, vec![]);
    assert_eq!(scan(&ledger, QUOTES_TABLE, &[]).await.len(), 5);
    assert_eq!(
        scan(&ledger, QUOTES_TABLE, &["host1", "bob"]).await,
        vec![quote_row("host1", "bob", "t1", "n1")]
    );
}

#[tokio::test]
async fn test_full_key_prefix_matches_one_row() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();
    ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "alice", "t1", "n1"))
        .unwrap();
    ledger
        .insert_row(QUOTES_TABLE, quote_row("host1", "alice", "t1", "n2"))
        .unwrap();

    let rows = scan(&ledger, QUOTES_TABLE, &["host1", "alice", "t1", "n2"]).await;
    assert_eq!(rows, vec![quote_row("host1", "alice", "t1", "n2")]);
}

#[test]
fn test_overlong_prefix_fails() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.create_table(&quotes_schema()).unwrap();

    let prefix: Vec<ColumnValue> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|s| ColumnValue::from(*s))
        .collect();
    assert!(matches!(
        ledger.match_rows(QUOTES_TABLE, &prefix),
        Err(TableError::InvalidPrefix(_))
    ));
}

#[tokio::test]
async fn test_typed_columns_round_trip() {
    let mut ledger = SqliteLedger::in_memory().unwrap();
    let schema = TableSchema::new(
        "Typed",
        vec![
            ColumnDefinition::key("id", ColumnType::Int64),
            ColumnDefinition::value("flag", ColumnType::Bool),
            ColumnDefinition::value("blob", ColumnType::Bytes),
        ],
    );
    ledger.create_table(&schema).unwrap();

    let row = Row::new(vec![
        ColumnValue::Int64(-42),
        ColumnValue::Bool(true),
        ColumnValue::Bytes(vec![0, 1, 255]),
    ]);
    assert!(ledger.insert_row("Typed", row.clone()).unwrap());

    let rows = ledger
        .match_rows("Typed", &[ColumnValue::Int64(-42)])
        .unwrap()
        .drain()
        .await;
    assert_eq!(rows, vec![row]);
}
