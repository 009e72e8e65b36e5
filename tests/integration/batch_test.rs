//! Batch pipeline tests against the scripted mock data source.

use db_querydeck::batch::{is_separator, validate_selection, BatchExecutor, SchemaPolicy};
use db_querydeck::catalog::QueryCatalog;
use db_querydeck::config::QueryEntry;
use db_querydeck::db::{MockDataSource, Value};
use db_querydeck::error::DeckError;
use db_querydeck::session::QuerySession;
use pretty_assertions::assert_eq;

fn catalog(names: &[&str]) -> QueryCatalog {
    let queries = names
        .iter()
        .map(|name| QueryEntry {
            name: name.to_string(),
            sql: format!("SELECT * FROM {}", name.to_lowercase()),
        })
        .collect();
    QueryCatalog::new(queries, vec![]).unwrap()
}

#[tokio::test]
async fn test_selection_order_does_not_matter() {
    let catalog = catalog(&["Items", "Orders", "Returns", "Staff"]);
    let source = MockDataSource::new()
        .with_rows("SELECT * FROM items", &["id"], vec![vec![Value::Int(1)]])
        .with_rows("SELECT * FROM returns", &["id"], vec![vec![Value::Int(3)]])
        .with_rows("SELECT * FROM staff", &["id"], vec![vec![Value::Int(4)]]);

    let forward = validate_selection([0, 2, 3], &catalog).unwrap();
    let backward = validate_selection([3, 2, 0, 0], &catalog).unwrap();
    assert_eq!(forward, backward);

    let executor = BatchExecutor::new(&catalog);
    let first = executor.run_batch(&forward, &source).await.unwrap();
    let second = executor.run_batch(&backward, &source).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        source.stats().executed,
        vec![
            "SELECT * FROM items",
            "SELECT * FROM returns",
            "SELECT * FROM staff",
            "SELECT * FROM items",
            "SELECT * FROM returns",
            "SELECT * FROM staff",
        ]
    );
}

#[tokio::test]
async fn test_row_accounting() {
    let catalog = catalog(&["Items", "Orders", "Returns"]);
    let source = MockDataSource::new()
        .with_rows(
            "SELECT * FROM items",
            &["id", "brand"],
            vec![
                vec![Value::Int(1), Value::from("Gala")],
                vec![Value::Int(2), Value::from("Fuji")],
            ],
        )
        .with_rows("SELECT * FROM orders", &["total"], vec![])
        .with_rows(
            "SELECT * FROM returns",
            &["reason"],
            vec![vec![Value::from("bruised")]],
        );

    let result = BatchExecutor::new(&catalog)
        .run_batch(&[0, 1, 2], &source)
        .await
        .unwrap();

    let separators = result.rows.iter().filter(|row| is_separator(row)).count();
    assert_eq!(separators, 2);
    assert_eq!(result.data_rows().count(), 3);
    assert_eq!(result.rows.len(), 5);
    assert_eq!(result.schema, vec!["id", "brand"]);
}

#[tokio::test]
async fn test_every_failure_position_releases_once() {
    let catalog = catalog(&["A", "B", "C"]);

    for failing in 0..3 {
        let mut source = MockDataSource::new();
        for (id, query) in catalog.list_queries().iter().enumerate() {
            source = if id == failing {
                source.with_error(query.text.clone(), "boom")
            } else {
                source.with_rows(query.text.clone(), &["x"], vec![vec![Value::Int(id as i64)]])
            };
        }

        let err = BatchExecutor::new(&catalog)
            .run_batch(&[0, 1, 2], &source)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DeckError::QueryExecution {
                id: failing,
                message: "boom".to_string(),
            }
        );
        let stats = source.stats();
        assert_eq!(stats.acquired, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.executed.len(), failing + 1);
    }
}

#[tokio::test]
async fn test_strict_policy_from_session() {
    let source = MockDataSource::new()
        .with_rows("SELECT * FROM jan", &["month", "total"], vec![])
        .with_rows("SELECT * FROM feb", &["total"], vec![]);
    let mut session = QuerySession::new(catalog(&["Jan", "Feb"]), Box::new(source.clone()))
        .with_policy(SchemaPolicy::Strict);

    let err = session.run([0, 1]).await.unwrap_err();

    assert_eq!(err.category(), "Schema Error");
    assert!(session.current().is_none());
    assert_eq!(source.stats().released, 1);
}

#[tokio::test]
async fn test_builtin_scenarios_run_through_session() {
    let catalog = QueryCatalog::builtin();
    let source = catalog
        .list_queries()
        .iter()
        .fold(MockDataSource::new(), |source, q| {
            source.with_rows(q.text.clone(), &["n"], vec![vec![Value::Int(q.id as i64)]])
        });
    let mut session = QuerySession::new(catalog.clone(), Box::new(source));

    for scenario in catalog.scenarios() {
        let summary = session
            .run_scenario(&scenario.display_name)
            .await
            .unwrap();

        let mut expected = scenario.member_query_ids.clone();
        expected.sort_unstable();
        assert_eq!(summary.query_ids, expected);

        let result = session.current().unwrap();
        assert_eq!(result.data_rows().count(), expected.len());
    }
}
