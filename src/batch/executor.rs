//! Batch execution over a single data-source session.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::merger::{BatchResult, ResultMerger, SchemaPolicy};
use crate::catalog::QueryCatalog;
use crate::db::{DataSession, DataSource};
use crate::error::{DeckError, Result};

/// Runs validated selections against a data source.
#[derive(Debug, Clone, Copy)]
pub struct BatchExecutor<'a> {
    catalog: &'a QueryCatalog,
    policy: SchemaPolicy,
}

impl<'a> BatchExecutor<'a> {
    /// Creates an executor with the lenient schema policy.
    pub fn new(catalog: &'a QueryCatalog) -> Self {
        Self {
            catalog,
            policy: SchemaPolicy::Lenient,
        }
    }

    pub fn with_policy(mut self, policy: SchemaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the given queries in order and merges their results.
    ///
    /// One session is acquired for the whole batch and released before this
    /// returns, whether the batch succeeded or not. The first failing query
    /// aborts the batch and nothing accumulated so far is returned.
    pub async fn run_batch(
        &self,
        ordered_ids: &[usize],
        source: &dyn DataSource,
    ) -> Result<BatchResult> {
        let start = Instant::now();

        let mut session = source.acquire().await.map_err(|e| match e {
            DeckError::Connection(_) => e,
            other => DeckError::connection(other.to_string()),
        })?;

        let outcome = self.run_in_session(ordered_ids, session.as_mut()).await;

        if let Err(e) = session.release().await {
            warn!("Failed to release session: {e}");
        }

        match &outcome {
            Ok(result) => info!(
                queries = ordered_ids.len(),
                rows = result.rows.len(),
                "Batch finished in {:?}",
                start.elapsed()
            ),
            Err(e) => warn!(queries = ordered_ids.len(), "Batch aborted: {e}"),
        }

        outcome
    }

    async fn run_in_session(
        &self,
        ordered_ids: &[usize],
        session: &mut dyn DataSession,
    ) -> Result<BatchResult> {
        let mut merger = ResultMerger::new(self.policy);

        for &id in ordered_ids {
            let query = self
                .catalog
                .get(id)
                .ok_or(DeckError::UnknownQueryId(id))?;

            debug!("Running query {} ({})", id, query.display_name);
            let result = session
                .execute_query(&query.text)
                .await
                .map_err(|e| DeckError::query_execution(id, e))?;

            debug!(
                "Query {} returned {} rows in {:?}",
                id,
                result.row_count(),
                result.execution_time
            );

            let columns = result.column_names();
            merger.push(query, columns, result.rows)?;
        }

        Ok(merger.finish())
    }
}
