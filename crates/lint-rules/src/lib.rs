//! Rule model for the lint engine
//!
//! Everything the configuration layer and the engine agree on about rules:
//!
//! - [`ConfigValue`] - the parsed, untyped form of a configuration document
//!   with typed decoders
//! - [`RuleDescriptor`] and [`Capabilities`] - static facts about a rule
//! - [`RuleCatalog`] - the registry of rules and their deprecated aliases
//! - [`Rule`] - the boundary to the analyzers that actually inspect files
//! - [`Violation`] - what analyzers report

pub mod catalog;
pub mod custom;
pub mod descriptor;
pub mod error;
pub mod file;
pub mod rule;
pub mod storage;
pub mod value;
pub mod violation;

pub use catalog::{CatalogEntry, RuleCatalog, RuleFactory};
pub use custom::CustomRuleConfig;
pub use descriptor::{Capabilities, RuleDescriptor};
pub use error::{Error, Result};
pub use file::SourceFile;
pub use rule::Rule;
pub use storage::RuleStorage;
pub use value::{ConfigValue, DecodeError, FromConfigValue};
pub use violation::{Location, Severity, Violation};

/// Identifier that stands for every rule in suppression commands and lists.
pub const ALL_RULES: &str = "all";

/// Meta rule that reports suppressions which suppress nothing.
pub const SUPERFLUOUS_DISABLE_COMMAND: &str = "superfluous_disable_command";

/// Catalog rule that runs the regex rules declared under `custom_rules`.
pub const CUSTOM_RULES: &str = "custom_rules";
