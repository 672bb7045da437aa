//! Error types for lint-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a CLI run
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] lint_config::Error),

    #[error(transparent)]
    Engine(#[from] lint_engine::Error),

    #[error(transparent)]
    Rules(#[from] lint_rules::Error),

    #[error(transparent)]
    Fs(#[from] lint_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid tool version: {0}")]
    Version(#[from] semver::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
