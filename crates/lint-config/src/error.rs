//! Error types for lint-config

use std::path::PathBuf;

/// Result type for lint-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal configuration errors.
///
/// Everything recoverable is reported through the
/// [`WarningSession`](crate::WarningSession) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found at {path}")]
    FileNotFound { path: PathBuf },

    /// Catch-all with a message naming the offending path or identifier
    #[error("{message}")]
    Generic { message: String },

    /// A configuration references itself through child/parent links
    #[error(
        "There's a cycle of child / parent config references: {chain}. Please check the hierarchy of configuration files passed via the command line and the childConfig / parentConfig entries within them."
    )]
    CycleDetected { chain: String },

    /// A configuration would get more than one child
    #[error(
        "Ambiguous child configurations for {vertex}: {children}. A configuration can have at most one child, either via child_config or via a later command-line config."
    )]
    AmbiguousChild { vertex: String, children: String },

    /// A configuration would get more than one parent
    #[error(
        "Ambiguous parent configurations for {vertex}: {parents}. A configuration can have at most one parent."
    )]
    AmbiguousParent { vertex: String, parents: String },

    /// A remote configuration points at a local file
    #[error("Remote configs are not allowed to reference local configs ('{url}' references '{reference}').")]
    RemoteReferencesLocal { url: String, reference: String },

    /// Same rule configured under more than one of its names
    #[error("Multiple configurations found for '{identifier}'. Check for any aliases: {aliases}.")]
    DuplicateRuleConfiguration { identifier: String, aliases: String },

    /// Same identifier listed more than once in a mode list
    #[error("'{identifier}' is listed more than once in '{list}'")]
    DuplicateIdentifier { identifier: String, list: String },

    /// `only_rules` combined with `disabled_rules` / `opt_in_rules`
    #[error("'disabled_rules' or 'opt_in_rules' cannot be used in combination with 'only_rules'")]
    OnlyRulesConflict,

    /// Remote document unavailable and nothing cached to fall back to
    #[error("Unable to load remote config from '{url}': {reason}. Also didn't find cached version to fallback to.")]
    RemoteFetch { url: String, reason: String },

    /// YAML that does not parse, or a document that is not a map
    #[error("Invalid configuration at {origin}: {message}")]
    InvalidYaml { origin: String, message: String },

    /// A key has a value of the wrong shape
    #[error("Invalid configuration at {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: lint_rules::DecodeError,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from lint-fs
    #[error(transparent)]
    Fs(#[from] lint_fs::Error),

    /// Catalog error from lint-rules
    #[error(transparent)]
    Rules(#[from] lint_rules::Error),
}

impl Error {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    pub fn decode(origin: impl Into<String>, source: lint_rules::DecodeError) -> Self {
        Self::Decode {
            origin: origin.into(),
            source,
        }
    }
}
