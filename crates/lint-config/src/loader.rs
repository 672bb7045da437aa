//! Entry point from command-line inputs to one effective policy

use std::sync::Arc;

use lint_fs::{LintPath, NormalizedPath};
use lint_rules::{ConfigValue, RuleCatalog};
use semver::Version;

use crate::configuration::{Configuration, ParseContext};
use crate::graph::FileGraph;
use crate::mode::{Namespace, RuleLists, RulesMode};
use crate::remote::{RemoteConfigCache, RemoteFetcher};
use crate::{Result, WarningSession};

/// What the caller asked for.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Configuration files in precedence order, later ones winning
    pub config_paths: Vec<String>,
    pub enable_all_rules: bool,
    /// Replaces the merged activation mode when non-empty
    pub only_rules: Vec<String>,
    pub tool_version: Version,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            config_paths: Vec::new(),
            enable_all_rules: false,
            only_rules: Vec::new(),
            tool_version: Version::new(0, 0, 0),
        }
    }
}

/// Resolves configuration files relative to a working directory.
pub struct ConfigurationLoader<'a> {
    catalog: &'a RuleCatalog,
    session: &'a WarningSession,
    working_directory: NormalizedPath,
    remote: RemoteConfigCache,
}

impl<'a> ConfigurationLoader<'a> {
    pub fn new(
        catalog: &'a RuleCatalog,
        session: &'a WarningSession,
        working_directory: NormalizedPath,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let remote = RemoteConfigCache::new(working_directory.clone(), fetcher);
        Self {
            catalog,
            session,
            working_directory,
            remote,
        }
    }

    /// Build, validate and fold the configuration graph.
    ///
    /// Without explicit paths the default file in the working directory is
    /// used when present; otherwise the result is the default policy.
    pub fn load(&self, options: &LoadOptions) -> Result<Configuration> {
        let ctx = ParseContext {
            catalog: self.catalog,
            session: self.session,
            enable_all_rules: options.enable_all_rules,
            tool_version: &options.tool_version,
        };

        let mut paths = options.config_paths.clone();
        if paths.is_empty() {
            let default = self.working_directory.join(LintPath::DefaultConfig.as_str());
            if default.is_file() {
                paths.push(default.as_str().to_string());
            }
        }

        let graph = FileGraph::build(&paths, &self.working_directory, &self.remote, self.session)?;
        let mut config = match graph.resolve(ctx)? {
            Some(config) => config,
            None => Configuration::from_document(
                &ConfigValue::Null,
                LintPath::DefaultConfig.as_str(),
                &self.working_directory,
                ctx,
            )?,
        };

        config.rules.retain_known_identifiers(self.catalog, self.session);
        if !options.only_rules.is_empty() {
            self.restrict_to(&mut config, &options.only_rules)?;
        }

        config
            .rules
            .warn_about_inactive_configurations(self.catalog, self.session);
        tracing::debug!(
            documents = graph.vertices().len(),
            active = config.rules.active_identifiers(self.catalog).len(),
            "Resolved configuration"
        );
        Ok(config)
    }

    fn restrict_to(&self, config: &mut Configuration, only_rules: &[String]) -> Result<()> {
        let lists = RuleLists {
            only_rules: only_rules.to_vec(),
            ..Default::default()
        };
        let mode = RulesMode::make(
            &lists,
            Namespace {
                catalog: self.catalog,
                custom_rules: Some(&config.rules.declared_custom_rules),
            },
            self.session,
        )?;
        config.rules.custom_rules.retain(|r| mode.activates_custom(&r.identifier));
        config.rules.mode = mode;
        Ok(())
    }
}
