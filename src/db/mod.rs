//! Database abstraction layer for querydeck.
//!
//! Provides a trait-based interface for data sources, allowing different
//! database backends to be used interchangeably by the batch executor.

mod mock;
mod postgres;
mod sqlite;
mod types;

pub use mock::{MockDataSource, MockStats};
pub use postgres::PostgresSource;
pub use sqlite::SqliteSource;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Per-statement timeout enforced by the bundled connectors.
pub(crate) const QUERY_TIMEOUT_SECS: u64 = 30;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend, if it uses one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Postgres => Some(5432),
            Self::Sqlite => None,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Creates a data source for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DataSource>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let source = PostgresSource::connect(config).await?;
            Ok(Box::new(source))
        }
        DatabaseBackend::Sqlite => {
            let source = SqliteSource::connect(config).await?;
            Ok(Box::new(source))
        }
    }
}

/// A database that can hand out sessions.
///
/// A batch acquires exactly one session and releases it before returning.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Acquires a session. Failures surface as `DeckError::Connection`.
    async fn acquire(&self) -> Result<Box<dyn DataSession>>;

    /// Closes the data source and any pooled connections.
    async fn close(&self) -> Result<()>;
}

/// One connection-scoped unit of work.
#[async_trait]
pub trait DataSession: Send {
    /// Executes a SQL statement and returns its columns and rows.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Returns the session to its source.
    async fn release(self: Box<Self>) -> Result<()>;
}
