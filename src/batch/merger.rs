//! Folding per-query results into one display table.
//!
//! The header comes from the first query of the batch and never changes.
//! Every later query is introduced by a separator row (once the body already
//! has rows) and its rows are appended exactly as returned, even when their
//! shape differs from the header. `SchemaPolicy::Strict` turns such a
//! difference into an error instead.

use crate::catalog::QueryDefinition;
use crate::db::{Row, Value};
use crate::error::{DeckError, Result};
use serde::Serialize;

const SEPARATOR_PREFIX: &str = "--- ";
const SEPARATOR_SUFFIX: &str = " ---";

/// How later queries with different columns are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Append rows as-is; the table may be ragged.
    #[default]
    Lenient,
    /// Fail the batch when column names differ from the header.
    Strict,
}

impl SchemaPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// The merged output of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    /// Column names of the first query.
    pub schema: Vec<String>,
    /// Data rows and separator rows, in execution order.
    pub rows: Vec<Row>,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that are not separators.
    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !is_separator(row))
    }
}

/// One query's result captured for merging.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResult {
    pub query: QueryDefinition,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Label placed in a separator row.
pub fn separator_label(display_name: &str) -> String {
    format!("{SEPARATOR_PREFIX}{display_name}{SEPARATOR_SUFFIX}")
}

/// A separator row: one populated cell, nothing else.
pub fn separator_row(display_name: &str) -> Row {
    vec![Value::String(separator_label(display_name))]
}

/// Returns true when a row follows the separator convention.
pub fn is_separator(row: &[Value]) -> bool {
    let Some((first, rest)) = row.split_first() else {
        return false;
    };
    let is_label = first.as_str().is_some_and(|s| {
        s.len() >= SEPARATOR_PREFIX.len() + SEPARATOR_SUFFIX.len()
            && s.starts_with(SEPARATOR_PREFIX)
            && s.ends_with(SEPARATOR_SUFFIX)
    });
    is_label && rest.iter().all(Value::is_null)
}

/// Accumulates query results into a `BatchResult`.
#[derive(Debug, Default)]
pub struct ResultMerger {
    policy: SchemaPolicy,
    schema: Option<Vec<String>>,
    rows: Vec<Row>,
}

impl ResultMerger {
    pub fn new(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Adds the next query's result in execution order.
    pub fn push(
        &mut self,
        query: &QueryDefinition,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<()> {
        match &self.schema {
            None => self.schema = Some(columns),
            Some(expected) => {
                if self.policy == SchemaPolicy::Strict && *expected != columns {
                    return Err(DeckError::SchemaMismatch {
                        id: query.id,
                        expected: expected.clone(),
                        found: columns,
                    });
                }
            }
        }

        if !self.rows.is_empty() {
            self.rows.push(separator_row(&query.display_name));
        }
        self.rows.extend(rows);
        Ok(())
    }

    pub fn finish(self) -> BatchResult {
        BatchResult {
            schema: self.schema.unwrap_or_default(),
            rows: self.rows,
        }
    }
}

/// Merges captured results in order.
///
/// Pure: the same input always yields an equal `BatchResult`.
pub fn merge_results(captured: &[CapturedResult], policy: SchemaPolicy) -> Result<BatchResult> {
    let mut merger = ResultMerger::new(policy);
    for result in captured {
        merger.push(&result.query, result.columns.clone(), result.rows.clone())?;
    }
    Ok(merger.finish())
}
