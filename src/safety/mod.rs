//! Read-only guard for catalog queries.
//!
//! Parses catalog SQL and classifies it as safe, mutating, or destructive.
//! Catalog entries must be safe: a batch is a viewing operation.

mod parser;

pub use parser::SqlClassifier;

use crate::error::{DeckError, Result};
use std::fmt;
use tracing::warn;

/// Safety level classification for SQL queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Read-only queries (SELECT, EXPLAIN, SHOW).
    Safe,
    /// Data modification queries (INSERT, UPDATE, MERGE).
    Mutating,
    /// Data loss or schema changes (DELETE, DROP, TRUNCATE, ALTER, ...).
    Destructive,
}

impl SafetyLevel {
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Mutating => 1,
            Self::Destructive => 2,
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Truncate,
    Alter,
    Create,
    Grant,
    Revoke,
    Explain,
    Show,
    Merge,
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Alter => write!(f, "ALTER"),
            Self::Create => write!(f, "CREATE"),
            Self::Grant => write!(f, "GRANT"),
            Self::Revoke => write!(f, "REVOKE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Show => write!(f, "SHOW"),
            Self::Merge => write!(f, "MERGE"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub level: SafetyLevel,
    pub statement_type: StatementType,
}

impl ClassificationResult {
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.level == SafetyLevel::Safe
    }
}

/// Rejects a catalog query that parses as a write.
///
/// Text the parser cannot read is accepted with a warning, since catalog
/// queries may use vendor syntax the generic dialect does not cover.
pub fn ensure_read_only(name: &str, sql: &str) -> Result<()> {
    match SqlClassifier::new().try_classify(sql) {
        Ok(result) if result.is_read_only() => Ok(()),
        Ok(result) => Err(DeckError::config(format!(
            "Query '{name}' is not read-only ({} statement, {})",
            result.statement_type, result.level
        ))),
        Err(e) => {
            warn!("Could not verify query '{name}' is read-only: {e}");
            Ok(())
        }
    }
}
