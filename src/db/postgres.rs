//! PostgreSQL data source implementation.
//!
//! Provides `PostgresSource`, which owns a sqlx pool and hands out one
//! `PostgresSession` (a pooled connection) per batch.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DataSession, DataSource, QueryResult, Row, Value, QUERY_TIMEOUT_SECS};
use crate::error::{DeckError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Executor, Postgres, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL data source.
#[derive(Debug, Clone)]
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Connects to PostgreSQL, retrying transient failures with backoff.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&conn_str)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                    } else {
                        break;
                    }
                }
            }
        }

        match last_error {
            Some(e) => Err(map_connection_error(e, config)),
            None => Err(DeckError::connection("No connection attempt was made")),
        }
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn acquire(&self) -> Result<Box<dyn DataSession>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DeckError::connection(format!("Failed to acquire connection: {e}")))?;
        Ok(Box::new(PostgresSession { conn }))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// A pooled PostgreSQL connection held for the duration of one batch.
pub struct PostgresSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl DataSession for PostgresSession {
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
        // Dropping the pooled connection hands it back to the pool.
        drop(self.conn);
        Ok(())
    }
}

/// Streams all rows of a statement, then reads column metadata.
async fn fetch_rows(conn: &mut PgConnection, sql: &str) -> Result<(Vec<ColumnInfo>, Vec<Row>)> {
    let mut columns = Vec::new();
    let mut rows = Vec::new();

    {
        let mut stream = sqlx::query(sql).fetch(&mut *conn);
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| DeckError::query(format_query_error(e)))?
        {
            if rows.is_empty() {
                columns = column_info(&row);
            }
            rows.push(convert_row(&row));
        }
    }

    // Empty results carry no rows to read names from; ask the server instead.
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

fn column_info(row: &PgRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "NUMERIC" | "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(index)
            .ok()
            .flatten()
            .map(Value::Decimal)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),

        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(Value::Time)
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .ok()
            .flatten()
            .map(Value::TimestampTz)
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try to get as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> DeckError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        DeckError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        DeckError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        DeckError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        DeckError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        DeckError::connection(error.to_string())
    }
}

/// Formats a query error, appending PostgreSQL detail and hint when present.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
