//! Error types for recsync-connectors

/// Result type for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Errors that can occur while talking to a source
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// Source unreachable, unusable, or returned no sample row
    #[error("Connection to {backend} failed: {message}")]
    ConnectionFailure { backend: String, message: String },

    /// Introspection requested from a backend that cannot provide it
    #[error("{operation} is not supported for {backend}")]
    NotSupported {
        backend: String,
        operation: &'static str,
    },

    /// A query was rejected or failed while fetching rows
    #[error("Query failed: {message} (query: {query})")]
    Query { query: String, message: String },

    /// Connection parameters do not fit the configured backend
    #[error("Invalid connection parameters for {backend}: {message}")]
    InvalidParams { backend: String, message: String },

    /// Collection description is inconsistent
    #[error("Invalid collection configuration: {message}")]
    Configuration { message: String },

    /// A row does not have one value per column
    #[error("Row {index} has {actual} values but there are {expected} columns")]
    RowArity {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl ConnectorError {
    pub fn connection(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn query(query: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Query {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure means the source could not be reached at all
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailure { .. })
    }
}
