//! End-to-end batch tests against a SQLite database file.

use db_querydeck::batch::{validate_selection, BatchExecutor};
use db_querydeck::catalog::QueryCatalog;
use db_querydeck::config::{ConnectionConfig, QueryEntry, ScenarioEntry};
use db_querydeck::db::{self, DataSource, SqliteSource, Value};
use db_querydeck::error::DeckError;
use db_querydeck::session::QuerySession;
use pretty_assertions::assert_eq;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

const SEED: &[&str] = &[
    "CREATE TABLE item (item_id INTEGER PRIMARY KEY, brand TEXT NOT NULL, price REAL)",
    "CREATE TABLE orders (order_id INTEGER PRIMARY KEY, item_id INTEGER, paid BOOLEAN)",
    "INSERT INTO item VALUES (1, 'Gala', 1.25), (2, 'Fuji', 0.99), (3, 'Honeycrisp', NULL)",
    "INSERT INTO orders VALUES (10, 1, 1), (11, 3, 0)",
];

/// Creates a seeded database file and returns its directory and config.
async fn seeded_database() -> (TempDir, ConnectionConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grocery.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    for statement in SEED {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    let config = ConnectionConfig::sqlite(path.to_string_lossy().into_owned());
    (dir, config)
}

fn grocery_catalog() -> QueryCatalog {
    let queries = vec![
        ("All Items", "SELECT item_id, brand, price FROM item ORDER BY item_id"),
        ("Paid Orders", "SELECT order_id, paid FROM orders WHERE paid = 1"),
        ("Missing Table", "SELECT * FROM shipments"),
        ("No Orders", "SELECT order_id FROM orders WHERE order_id < 0"),
    ]
    .into_iter()
    .map(|(name, sql)| QueryEntry {
        name: name.to_string(),
        sql: sql.to_string(),
    })
    .collect();
    let scenarios = vec![ScenarioEntry {
        name: "Sales".to_string(),
        queries: vec![1, 0],
    }];
    QueryCatalog::new(queries, scenarios).unwrap()
}

#[tokio::test]
async fn test_batch_merges_sqlite_results() {
    let (_dir, config) = seeded_database().await;
    let catalog = grocery_catalog();
    let source = SqliteSource::connect(&config).await.unwrap();

    let ids = validate_selection([1, 0], &catalog).unwrap();
    let result = BatchExecutor::new(&catalog)
        .run_batch(&ids, &source)
        .await
        .unwrap();

    assert_eq!(result.schema, vec!["item_id", "brand", "price"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(1), Value::from("Gala"), Value::Float(1.25)],
            vec![Value::Int(2), Value::from("Fuji"), Value::Float(0.99)],
            vec![Value::Int(3), Value::from("Honeycrisp"), Value::Null],
            vec![Value::from("--- Paid Orders ---")],
            vec![Value::Int(10), Value::Bool(true)],
        ]
    );

    source.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_first_query_keeps_columns() {
    let (_dir, config) = seeded_database().await;
    let catalog = grocery_catalog();
    let source = SqliteSource::connect(&config).await.unwrap();

    let result = BatchExecutor::new(&catalog)
        .run_batch(&[3], &source)
        .await
        .unwrap();

    assert_eq!(result.schema, vec!["order_id"]);
    assert!(result.rows.is_empty());

    source.close().await.unwrap();
}

#[tokio::test]
async fn test_missing_table_aborts_batch() {
    let (_dir, config) = seeded_database().await;
    let catalog = grocery_catalog();
    let source = SqliteSource::connect(&config).await.unwrap();

    let err = BatchExecutor::new(&catalog)
        .run_batch(&[0, 2], &source)
        .await
        .unwrap_err();

    match err {
        DeckError::QueryExecution { id, message } => {
            assert_eq!(id, 2);
            assert!(message.contains("shipments"), "unexpected message: {message}");
        }
        other => panic!("Expected QueryExecution, got {:?}", other),
    }

    // The single pooled connection must be free again.
    let result = BatchExecutor::new(&catalog)
        .run_batch(&[1], &source)
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(10), Value::Bool(true)]]);

    source.close().await.unwrap();
}

#[tokio::test]
async fn test_session_scenario_over_factory_connection() {
    let (_dir, config) = seeded_database().await;
    let source = db::connect(&config).await.unwrap();
    let mut session = QuerySession::new(grocery_catalog(), source);

    let summary = session.run_scenario("sales").await.unwrap();

    assert_eq!(summary.query_ids, vec![0, 1]);
    let current = session.current().unwrap();
    assert_eq!(current.data_rows().count(), 4);

    session.close().await.unwrap();
}
