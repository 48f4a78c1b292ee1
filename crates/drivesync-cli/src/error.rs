//! Error types for drivesync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from drivesync-core
    #[error(transparent)]
    Core(#[from] drivesync_core::Error),

    /// Config file could not be read or parsed
    #[error(transparent)]
    Fs(#[from] drivesync_fs::Error),

    /// Report serialization error
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

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
}
