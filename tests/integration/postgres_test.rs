//! PostgreSQL batch tests.
//!
//! Skipped unless DATABASE_URL points at a reachable server.

use db_querydeck::batch::BatchExecutor;
use db_querydeck::catalog::QueryCatalog;
use db_querydeck::config::{ConnectionConfig, QueryEntry};
use db_querydeck::db::{DataSource, PostgresSource, Value};
use db_querydeck::error::DeckError;
use pretty_assertions::assert_eq;

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test source.
async fn get_test_source() -> Option<PostgresSource> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresSource::connect(&config).await.ok()
}

fn catalog(queries: &[(&str, &str)]) -> QueryCatalog {
    let entries = queries
        .iter()
        .map(|(name, sql)| QueryEntry {
            name: name.to_string(),
            sql: sql.to_string(),
        })
        .collect();
    QueryCatalog::new(entries, vec![]).unwrap()
}

#[tokio::test]
async fn test_postgres_batch_with_ragged_rows() {
    let Some(source) = get_test_source().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let catalog = catalog(&[
        ("Numbers", "SELECT 1::int8 AS n, 'one' AS word"),
        ("Flags", "SELECT true AS flag"),
    ]);

    let result = BatchExecutor::new(&catalog)
        .run_batch(&[0, 1], &source)
        .await
        .unwrap();

    assert_eq!(result.schema, vec!["n", "word"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(1), Value::from("one")],
            vec![Value::from("--- Flags ---")],
            vec![Value::Bool(true)],
        ]
    );

    source.close().await.unwrap();
}

#[tokio::test]
async fn test_postgres_empty_result_has_columns() {
    let Some(source) = get_test_source().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let catalog = catalog(&[("Nothing", "SELECT 1 AS a, 2 AS b WHERE false")]);

    let result = BatchExecutor::new(&catalog)
        .run_batch(&[0], &source)
        .await
        .unwrap();

    assert_eq!(result.schema, vec!["a", "b"]);
    assert!(result.rows.is_empty());

    source.close().await.unwrap();
}

#[tokio::test]
async fn test_postgres_error_aborts_batch() {
    let Some(source) = get_test_source().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let catalog = catalog(&[
        ("Ok", "SELECT 1 AS a"),
        ("Broken", "SELECT * FROM querydeck_no_such_table"),
        ("Never", "SELECT 3 AS a"),
    ]);

    let err = BatchExecutor::new(&catalog)
        .run_batch(&[0, 1, 2], &source)
        .await
        .unwrap_err();

    match err {
        DeckError::QueryExecution { id, message } => {
            assert_eq!(id, 1);
            assert!(message.contains("querydeck_no_such_table"));
        }
        other => panic!("Expected QueryExecution, got {:?}", other),
    }

    source.close().await.unwrap();
}
