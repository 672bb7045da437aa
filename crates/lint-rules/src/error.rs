//! Error types for lint-rules

/// Result type for lint-rules operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying the rule catalog
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two catalog entries share an identifier
    #[error("Rule '{identifier}' is registered twice")]
    DuplicateRule { identifier: String },

    /// An alias would map to two different rules
    #[error("Alias '{alias}' already maps to '{existing}', cannot also map to '{requested}'")]
    AliasConflict {
        alias: String,
        existing: String,
        requested: String,
    },

    /// Identifier not present in the catalog
    #[error("Unknown rule: {identifier}")]
    UnknownRule { identifier: String },

    /// Rule configuration payload has the wrong shape
    #[error("Invalid configuration for rule '{identifier}': {source}")]
    InvalidRuleConfiguration {
        identifier: String,
        #[source]
        source: crate::DecodeError,
    },
}
