//! Error types for recsync-core

use recsync_connectors::ConnectorError;

/// Result type for recsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in recsync-core operations
///
/// Three classes matter to the orchestrator:
/// - connection failures skip a target (or abort the run at the initial
///   remote probe)
/// - configuration errors abort the affected target
/// - data errors fail the record or batch being transformed
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote API unreachable, unauthorized or answering non-2xx
    #[error("Connection to {endpoint} failed: {message}")]
    ConnectionFailure { endpoint: String, message: String },

    /// Malformed mapping, collection or connection settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A template references a field the row does not have
    #[error("Cannot render '{template}' for field '{field}': source field '{missing}' is missing")]
    TemplateRender {
        field: String,
        template: String,
        missing: String,
    },

    /// A rendered value does not fit the destination type
    #[error("Field '{field}' expects {expected}, got '{value}'")]
    TypeCoercion {
        field: String,
        value: String,
        expected: String,
    },

    /// A record lacks its identifier field
    #[error("Record has no identifier field '{ident}'")]
    MissingIdent { ident: String },

    /// Error from a source connector
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// Filesystem error from recsync-fs
    #[error(transparent)]
    Fs(#[from] recsync_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Settings are wrong; retrying the same run cannot help
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::Connector(ConnectorError::Configuration { .. })
                | Self::Connector(ConnectorError::InvalidParams { .. })
        )
    }

    /// A record's content cannot be mapped
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            Self::TemplateRender { .. } | Self::TypeCoercion { .. } | Self::MissingIdent { .. }
        )
    }

    /// The remote or a source could not be reached
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailure { .. } | Self::Connector(ConnectorError::ConnectionFailure { .. })
        )
    }
}
