//! Error types for querydeck.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for querydeck operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    /// The selection contained no queries.
    #[error("No queries selected. Please select between 1 and {max} queries.")]
    EmptySelection { max: usize },

    /// The selection exceeded the batch limit.
    #[error("{count} queries selected. Please select between 1 and {max} queries.")]
    TooManySelected { count: usize, max: usize },

    /// A query id that the catalog does not know about.
    #[error("Unknown query id: {0}")]
    UnknownQueryId(usize),

    /// A query in a batch was rejected by the data source.
    #[error("Database error: {message}")]
    QueryExecution { id: usize, message: String },

    /// A later query returned different columns while strict mode was on.
    #[error("Query {id} returned columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        id: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Errors raised by a data source while running a single statement.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wraps a data-source failure for the query with the given id.
    ///
    /// Connector messages are kept verbatim; only the outer variant changes.
    pub fn query_execution(id: usize, cause: DeckError) -> Self {
        let message = match cause {
            Self::Query(msg) | Self::Connection(msg) | Self::Internal(msg) => msg,
            other => other.to_string(),
        };
        Self::QueryExecution { id, message }
    }

    /// Returns true for errors raised before any I/O is attempted.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::EmptySelection { .. } | Self::TooManySelected { .. }
        )
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptySelection { .. } | Self::TooManySelected { .. } => "Selection Error",
            Self::UnknownQueryId(_) => "Catalog Error",
            Self::QueryExecution { .. } | Self::Query(_) => "Query Error",
            Self::SchemaMismatch { .. } => "Schema Error",
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using DeckError.
pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_empty_selection() {
        let err = DeckError::EmptySelection { max: 5 };
        assert_eq!(
            err.to_string(),
            "No queries selected. Please select between 1 and 5 queries."
        );
        assert_eq!(err.category(), "Selection Error");
        assert!(err.is_selection_error());
    }

    #[test]
    fn test_error_display_too_many() {
        let err = DeckError::TooManySelected { count: 7, max: 5 };
        assert_eq!(
            err.to_string(),
            "7 queries selected. Please select between 1 and 5 queries."
        );
        assert!(err.is_selection_error());
    }

    #[test]
    fn test_query_execution_keeps_message_verbatim() {
        let err = DeckError::query_execution(
            2,
            DeckError::query("relation \"orders\" does not exist"),
        );
        assert_eq!(
            err,
            DeckError::QueryExecution {
                id: 2,
                message: "relation \"orders\" does not exist".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Database error: relation \"orders\" does not exist"
        );
        assert_eq!(err.category(), "Query Error");
        assert!(!err.is_selection_error());
    }

    #[test]
    fn test_query_execution_from_connection_loss() {
        let err = DeckError::query_execution(0, DeckError::connection("connection reset"));
        assert!(matches!(
            err,
            DeckError::QueryExecution { id: 0, ref message } if message == "connection reset"
        ));
    }

    #[test]
    fn test_error_display_schema_mismatch() {
        let err = DeckError::SchemaMismatch {
            id: 3,
            expected: vec!["a".to_string()],
            found: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Query 3 returned columns [\"b\", \"c\"], expected [\"a\"]"
        );
        assert_eq!(err.category(), "Schema Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = DeckError::config("missing field 'database' in connections.default");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'database' in connections.default"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeckError>();
    }
}
