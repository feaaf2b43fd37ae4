//! Error types for recsync-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code when the run cannot start at all
pub const EXIT_UNAVAILABLE: i32 = -1;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No configuration file where one was expected
    #[error("No configuration found at {}. Create one first.", path.display())]
    ConfigMissing { path: PathBuf },

    /// Initial probe of the remote API failed
    #[error("Remote API unavailable, nothing was sent: {0}")]
    RemoteUnavailable(#[source] recsync_core::Error),

    /// The requested target has no connection configured
    #[error("Target '{target}' is not configured")]
    TargetNotConfigured { target: recsync_core::Target },

    /// Error from recsync-core
    #[error(transparent)]
    Core(#[from] recsync_core::Error),

    /// Error from recsync-connectors
    #[error(transparent)]
    Connector(#[from] recsync_connectors::ConnectorError),

    /// Error from recsync-fs
    #[error(transparent)]
    Fs(#[from] recsync_fs::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigMissing { .. } | Self::RemoteUnavailable(_) => EXIT_UNAVAILABLE,
            _ => 1,
        }
    }
}
