//! Error types for lint-engine

use std::path::PathBuf;

/// Result type for lint-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while linting
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Baseline at {path} is not valid: {message}")]
    InvalidBaseline { path: PathBuf, message: String },

    #[error("No cache location configured")]
    NoCacheLocation,

    // Transparent wrappers for underlying crate errors
    /// Configuration error from lint-config
    #[error(transparent)]
    Config(#[from] lint_config::Error),

    /// Catalog error from lint-rules
    #[error(transparent)]
    Rules(#[from] lint_rules::Error),

    /// Filesystem error from lint-fs
    #[error(transparent)]
    Fs(#[from] lint_fs::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
