//! Mock data source for testing.
//!
//! Returns scripted results keyed by the exact SQL text and records every
//! acquire, release and executed statement so tests can check the session
//! lifecycle.

use super::{ColumnInfo, DataSession, DataSource, QueryResult, Row};
use crate::error::{DeckError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockResponse {
    Rows(QueryResult),
    Error(String),
}

/// Counters describing how a mock source was used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockStats {
    /// Number of sessions handed out.
    pub acquired: usize,
    /// Number of sessions returned.
    pub released: usize,
    /// Statements executed, in order.
    pub executed: Vec<String>,
}

/// A data source that answers from a fixed script.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    responses: Arc<HashMap<String, MockResponse>>,
    acquire_error: Option<String>,
    stats: Arc<Mutex<MockStats>>,
}

impl MockDataSource {
    /// Creates a mock source with no scripted statements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `sql` to return the given columns and rows.
    pub fn with_rows(self, sql: impl Into<String>, columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns
            .iter()
            .map(|name| ColumnInfo::new(*name, "text"))
            .collect();
        let result =
            QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1));
        self.with_response(sql.into(), MockResponse::Rows(result))
    }

    /// Scripts `sql` to fail with the given data-source message.
    pub fn with_error(self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_response(sql.into(), MockResponse::Error(message.into()))
    }

    /// Makes every `acquire` fail with the given message.
    pub fn with_acquire_error(mut self, message: impl Into<String>) -> Self {
        self.acquire_error = Some(message.into());
        self
    }

    /// Returns a snapshot of the usage counters.
    pub fn stats(&self) -> MockStats {
        lock(&self.stats).clone()
    }

    fn with_response(mut self, sql: String, response: MockResponse) -> Self {
        Arc::make_mut(&mut self.responses).insert(sql, response);
        self
    }
}

fn lock(stats: &Mutex<MockStats>) -> MutexGuard<'_, MockStats> {
    stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn acquire(&self) -> Result<Box<dyn DataSession>> {
        if let Some(message) = &self.acquire_error {
            return Err(DeckError::connection(message.clone()));
        }
        lock(&self.stats).acquired += 1;
        Ok(Box::new(MockSession {
            responses: Arc::clone(&self.responses),
            stats: Arc::clone(&self.stats),
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockSession {
    responses: Arc<HashMap<String, MockResponse>>,
    stats: Arc<Mutex<MockStats>>,
}

#[async_trait]
impl DataSession for MockSession {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        lock(&self.stats).executed.push(sql.to_string());

        match self.responses.get(sql) {
            Some(MockResponse::Rows(result)) => Ok(result.clone()),
            Some(MockResponse::Error(message)) => Err(DeckError::query(message.clone())),
            None => Err(DeckError::query(format!("no scripted result for: {sql}"))),
        }
    }

    async fn release(self: Box<Self>) -> Result<()> {
        lock(&self.stats).released += 1;
        Ok(())
    }
}
