//! SQLite data source implementation.
//!
//! Useful for local snapshots of a database and for end-to-end tests that
//! need a real SQL engine without a server.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DataSession, DataSource, QueryResult, Row, Value, QUERY_TIMEOUT_SECS};
use crate::error::{DeckError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Sqlite, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// SQLite data source.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    /// Opens the database file named by `config.database`.
    ///
    /// The file must already exist; a missing file is a connection error.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| DeckError::config(format!("Invalid database path: {e}")))?
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                DeckError::connection(format!(
                    "Failed to open {}: {e}",
                    config.display_string()
                ))
            })?;

        debug!("Opened SQLite database {}", config.display_string());
        Ok(Self { pool })
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    async fn acquire(&self) -> Result<Box<dyn DataSession>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DeckError::connection(format!("Failed to acquire connection: {e}")))?;
        Ok(Box::new(SqliteSession { conn }))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// A pooled SQLite connection held for the duration of one batch.
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

#[async_trait]
impl DataSession for SqliteSession {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let (columns, rows) = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            fetch_rows(&mut self.conn, sql),
        )
        .await
        .map_err(|_| {
            DeckError::query(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })??;

        Ok(QueryResult::with_data(columns, rows).with_execution_time(start.elapsed()))
    }

    async fn release(self: Box<Self>) -> Result<()> {
        drop(self.conn);
        Ok(())
    }
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    sql: &str,
) -> Result<(Vec<ColumnInfo>, Vec<Row>)> {
    let mut columns = Vec::new();
    let mut rows = Vec::new();

    {
        let mut stream = sqlx::query(sql).fetch(&mut *conn);
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| DeckError::query(e.to_string()))?
        {
            if rows.is_empty() {
                columns = column_info(&row);
            }
            rows.push(convert_row(&row));
        }
    }

    if rows.is_empty() {
        columns = match (&mut *conn).describe(sql).await {
            Ok(describe) => describe
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            Err(e) => {
                debug!("Could not describe empty result: {e}");
                Vec::new()
            }
        };
    }

    Ok((columns, rows))
}

fn column_info(row: &SqliteRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts one SQLite cell using its storage class.
///
/// SQLite is dynamically typed, so the value's own type wins over the
/// declared column type. Declared BOOLEAN columns still decode as booleans.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let storage = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage.as_str() {
        "INTEGER" if declared.eq_ignore_ascii_case("BOOLEAN") => row
            .try_get::<bool, _>(index)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "INTEGER" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),
        "REAL" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
