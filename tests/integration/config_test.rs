//! Config-file driven catalogs.

use db_querydeck::catalog::QueryCatalog;
use db_querydeck::config::Config;
use db_querydeck::db::DatabaseBackend;
use db_querydeck::error::DeckError;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_catalog_from_config_file() {
    let file = write_config(
        r#"
[connections.default]
backend = "sqlite"
database = "grocery.db"

[batch]
strict_schema = true

[[catalog.queries]]
name = "Items"
sql = "SELECT * FROM item"

[[catalog.queries]]
name = "Orders"
sql = "SELECT * FROM orders"

[[catalog.scenarios]]
name = "Everything"
queries = [1, 0]
"#,
    );

    let config = Config::load_from_file(file.path()).unwrap();
    assert!(config.batch.strict_schema);
    assert_eq!(
        config.get_connection(None).unwrap().backend,
        DatabaseBackend::Sqlite
    );

    let catalog = QueryCatalog::from_config(config.catalog.as_ref().unwrap()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(1).unwrap().display_name, "Orders");
    assert_eq!(
        catalog.queries_for_scenario(0).unwrap().into_iter().collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn test_write_query_in_config_is_rejected() {
    let file = write_config(
        r#"
[[catalog.queries]]
name = "Cleanup"
sql = "DELETE FROM orders"
"#,
    );

    let config = Config::load_from_file(file.path()).unwrap();
    let err = QueryCatalog::from_config(config.catalog.as_ref().unwrap()).unwrap_err();
    assert!(matches!(err, DeckError::Config(ref msg) if msg.contains("Cleanup")));
}

#[test]
fn test_scenario_out_of_range_is_rejected() {
    let file = write_config(
        r#"
[[catalog.queries]]
name = "Items"
sql = "SELECT * FROM item"

[[catalog.scenarios]]
name = "Broken"
queries = [0, 4]
"#,
    );

    let config = Config::load_from_file(file.path()).unwrap();
    assert!(QueryCatalog::from_config(config.catalog.as_ref().unwrap()).is_err());
}

#[test]
fn test_missing_catalog_section_uses_builtin() {
    let file = write_config("[batch]\nstrict_schema = false\n");
    let config = Config::load_from_file(file.path()).unwrap();
    assert!(config.catalog.is_none());
    assert_eq!(QueryCatalog::builtin().len(), 10);
}
