//! Configuration resolution for the lint engine
//!
//! Turns a hierarchy of local and remote configuration documents into one
//! effective [`Configuration`]:
//!
//! - [`FileGraph`] discovers documents through `child_config` and
//!   `parent_config` references, fetching remote ones through
//!   [`RemoteConfigCache`]
//! - [`RulesMode`] validates the activation lists of each document
//! - [`RulesWrapper`] merges parent and child policies
//! - [`ConfigurationLoader`] drives the whole pipeline from command-line inputs

pub mod configuration;
pub mod error;
pub mod graph;
pub mod keys;
pub mod loader;
pub mod mode;
pub mod remote;
pub mod rule_configs;
pub mod session;
pub mod wrapper;

pub use configuration::{Configuration, Indentation, ParseContext, PathFilter};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeKind, FileGraph, Source, Vertex};
pub use keys::ConfigKey;
pub use loader::{ConfigurationLoader, LoadOptions};
pub use mode::{Namespace, RuleLists, RulesMode, resolve_alias};
pub use remote::{
    DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_IF_CACHED, FetchError, HttpFetcher, OfflineFetcher, RemoteConfigCache,
    RemoteFetcher,
};
pub use rule_configs::{RuleConfigEntry, RuleConfigs};
pub use semver::Version;
pub use session::WarningSession;
pub use wrapper::{RulesWrapper, merge_mode};
