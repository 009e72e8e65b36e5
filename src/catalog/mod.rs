//! Query catalog and scenario map.
//!
//! The catalog is an ordered, immutable registry of named queries. A query's
//! id is its 0-based position, so catalog order is also execution order.
//! Scenarios are named presets that seed a selection with catalog ids.

mod builtin;

use crate::config::{CatalogConfig, QueryEntry, ScenarioEntry};
use crate::error::{DeckError, Result};
use crate::safety;
use serde::Serialize;
use std::collections::BTreeSet;

/// A named, executable query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDefinition {
    pub id: usize,
    pub display_name: String,
    pub text: String,
}

/// A named preset selecting a subset of catalog queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioDefinition {
    pub id: usize,
    pub display_name: String,
    pub member_query_ids: Vec<usize>,
}

/// Ordered registry of queries and scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCatalog {
    queries: Vec<QueryDefinition>,
    scenarios: Vec<ScenarioDefinition>,
}

impl QueryCatalog {
    /// Builds a catalog from config entries, assigning ids by position.
    ///
    /// Fails when a name or query text is blank, when a scenario is empty or
    /// names a query that does not exist, or when a query is not read-only.
    pub fn new(queries: Vec<QueryEntry>, scenarios: Vec<ScenarioEntry>) -> Result<Self> {
        let queries: Vec<QueryDefinition> = queries
            .into_iter()
            .enumerate()
            .map(|(id, entry)| QueryDefinition {
                id,
                display_name: entry.name.trim().to_string(),
                text: entry.sql,
            })
            .collect();

        for query in &queries {
            if query.display_name.is_empty() {
                return Err(DeckError::config(format!("Query {} has no name", query.id)));
            }
            if query.text.trim().is_empty() {
                return Err(DeckError::config(format!(
                    "Query '{}' has no SQL text",
                    query.display_name
                )));
            }
            safety::ensure_read_only(&query.display_name, &query.text)?;
        }

        let scenarios: Vec<ScenarioDefinition> = scenarios
            .into_iter()
            .enumerate()
            .map(|(id, entry)| ScenarioDefinition {
                id,
                display_name: entry.name.trim().to_string(),
                member_query_ids: entry.queries,
            })
            .collect();

        for scenario in &scenarios {
            if scenario.member_query_ids.is_empty() {
                return Err(DeckError::config(format!(
                    "Scenario '{}' has no queries",
                    scenario.display_name
                )));
            }
            if let Some(bad) = scenario
                .member_query_ids
                .iter()
                .find(|id| **id >= queries.len())
            {
                return Err(DeckError::config(format!(
                    "Scenario '{}' refers to query {bad}, but the catalog has {} queries",
                    scenario.display_name,
                    queries.len()
                )));
            }
        }

        Ok(Self { queries, scenarios })
    }

    /// Builds a catalog from the `[catalog]` section of the config file.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        if config.queries.is_empty() {
            return Err(DeckError::config("Catalog defines no queries"));
        }
        Self::new(config.queries.clone(), config.scenarios.clone())
    }

    /// The built-in grocery store catalog.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// All queries in catalog order.
    pub fn list_queries(&self) -> &[QueryDefinition] {
        &self.queries
    }

    /// Looks up a query by id.
    pub fn get(&self, id: usize) -> Option<&QueryDefinition> {
        self.queries.get(id)
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// All scenarios in display order.
    pub fn scenarios(&self) -> &[ScenarioDefinition] {
        &self.scenarios
    }

    /// Finds a scenario by id or, failing that, by case-insensitive name.
    pub fn find_scenario(&self, key: &str) -> Option<&ScenarioDefinition> {
        let key = key.trim();
        if let Ok(id) = key.parse::<usize>() {
            return self.scenarios.get(id);
        }
        self.scenarios
            .iter()
            .find(|s| s.display_name.eq_ignore_ascii_case(key))
    }

    /// Returns the query ids a scenario selects.
    pub fn queries_for_scenario(&self, scenario_id: usize) -> Result<BTreeSet<usize>> {
        self.scenarios
            .get(scenario_id)
            .map(|s| s.member_query_ids.iter().copied().collect())
            .ok_or_else(|| DeckError::config(format!("Unknown scenario id: {scenario_id}")))
    }
}
