//! Command implementations

mod lint;
mod rules;

pub use lint::run_lint;
pub use rules::run_rules;

use std::sync::Arc;

use lint_config::{
    Configuration, ConfigurationLoader, HttpFetcher, LoadOptions, OfflineFetcher, RemoteFetcher, Version,
    WarningSession,
};
use lint_fs::NormalizedPath;
use lint_rules::RuleCatalog;

use crate::cli::ConfigArgs;
use crate::error::Result;

/// Version of this binary, checked against `swiftlint_version` and stored in the cache.
pub fn tool_version() -> Result<Version> {
    Ok(Version::parse(env!("CARGO_PKG_VERSION"))?)
}

/// Resolve the effective configuration for `cwd`.
pub fn load_configuration(
    cwd: &NormalizedPath,
    args: &ConfigArgs,
    catalog: &RuleCatalog,
    session: &WarningSession,
) -> Result<Configuration> {
    let fetcher: Arc<dyn RemoteFetcher> = if args.offline {
        Arc::new(OfflineFetcher)
    } else {
        Arc::new(HttpFetcher)
    };
    let loader = ConfigurationLoader::new(catalog, session, cwd.clone(), fetcher);
    let options = LoadOptions {
        config_paths: args.configs.clone(),
        enable_all_rules: args.enable_all_rules,
        only_rules: args.only_rules.clone(),
        tool_version: tool_version()?,
    };
    Ok(loader.load(&options)?)
}
