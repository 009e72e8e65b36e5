//! Query session: the catalog, a data source and the table currently shown.
//!
//! A selection is validated first; a rejected selection keeps the table on
//! screen. Once a batch starts the table is cleared, so a failed batch never
//! leaves a previous result behind.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::info;

use crate::batch::{validate_selection, BatchExecutor, BatchResult, SchemaPolicy};
use crate::catalog::{QueryCatalog, QueryDefinition};
use crate::db::DataSource;
use crate::error::{DeckError, Result};

/// Looks up a scenario by id or name and returns the ids it selects.
pub fn scenario_selection(catalog: &QueryCatalog, key: &str) -> Result<BTreeSet<usize>> {
    let scenario = catalog
        .find_scenario(key)
        .ok_or_else(|| DeckError::config(format!("Unknown scenario: {key}")))?;
    info!("Running scenario '{}'", scenario.display_name);
    catalog.queries_for_scenario(scenario.id)
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Query ids that ran, in execution order.
    pub query_ids: Vec<usize>,
    /// Wall-clock time for the whole batch.
    pub duration: Duration,
}

/// Owns a data source and the most recent batch result.
pub struct QuerySession {
    catalog: QueryCatalog,
    source: Box<dyn DataSource>,
    policy: SchemaPolicy,
    current: Option<BatchResult>,
}

impl QuerySession {
    pub fn new(catalog: QueryCatalog, source: Box<dyn DataSource>) -> Self {
        Self {
            catalog,
            source,
            policy: SchemaPolicy::Lenient,
            current: None,
        }
    }

    pub fn with_policy(mut self, policy: SchemaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The table from the last successful run, if any.
    pub fn current(&self) -> Option<&BatchResult> {
        self.current.as_ref()
    }

    /// Validates and runs a selection, replacing the displayed table.
    ///
    /// A rejected selection leaves the current table in place.
    pub async fn run<I>(&mut self, ids: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = usize>,
    {
        let ordered = validate_selection(ids, &self.catalog)?;
        self.run_validated(ordered).await
    }

    /// Runs every query of a scenario, looked up by id or name.
    pub async fn run_scenario(&mut self, key: &str) -> Result<RunSummary> {
        let ids = scenario_selection(&self.catalog, key)?;
        self.run(ids).await
    }

    /// Runs ids that already passed `validate_selection`.
    pub async fn run_validated(&mut self, ordered: Vec<usize>) -> Result<RunSummary> {
        self.current = None;

        let start = Instant::now();
        let result = BatchExecutor::new(&self.catalog)
            .with_policy(self.policy)
            .run_batch(&ordered, self.source.as_ref())
            .await?;

        self.current = Some(result);
        Ok(RunSummary {
            query_ids: ordered,
            duration: start.elapsed(),
        })
    }

    /// Definitions for the given ids, skipping any the catalog lacks.
    pub fn queries(&self, ids: &[usize]) -> Vec<&QueryDefinition> {
        ids.iter().filter_map(|id| self.catalog.get(*id)).collect()
    }

    /// Closes the underlying data source.
    pub async fn close(self) -> Result<()> {
        self.source.close().await
    }
}
