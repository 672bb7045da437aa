//! The effective policy of one or more configuration documents

use globset::{Glob, GlobMatcher};
use lint_fs::{NormalizedPath, checksum};
use lint_rules::{CUSTOM_RULES, ConfigValue, CustomRuleConfig, DecodeError, FromConfigValue, RuleCatalog};
use semver::{Version, VersionReq};
use serde::Serialize;

use crate::keys::ConfigKey;
use crate::mode::{Namespace, RuleLists, RulesMode};
use crate::rule_configs::RuleConfigs;
use crate::wrapper::RulesWrapper;
use crate::{Error, Result, WarningSession};

/// Indentation style for rules that care about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indentation {
    Tabs,
    Spaces(usize),
}

impl FromConfigValue for Indentation {
    fn from_config_value(value: &ConfigValue, path: &str) -> std::result::Result<Self, DecodeError> {
        match value {
            ConfigValue::String(s) if s == "tabs" || s == "tab" => Ok(Self::Tabs),
            ConfigValue::Int(_) => Ok(Self::Spaces(value.decode(path)?)),
            other => Err(DecodeError::mismatch(path, "a number of spaces or 'tabs'", other)),
        }
    }
}

/// Shared inputs for parsing documents.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub catalog: &'a RuleCatalog,
    pub session: &'a WarningSession,
    /// `--enable-all-rules`: every document uses [`RulesMode::AllEnabled`]
    pub enable_all_rules: bool,
    /// Version of the running tool, checked against `swiftlint_version`
    pub tool_version: &'a Version,
}

/// An effective policy.
///
/// Built from a single document with [`from_document`](Self::from_document)
/// and combined with [`merged`](Self::merged) along the configuration graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub rules: RulesWrapper,
    /// Directory relative paths in the document were resolved against
    pub root_directory: NormalizedPath,
    pub included: Vec<NormalizedPath>,
    pub excluded: Vec<NormalizedPath>,
    pub reporter: Option<String>,
    pub cache_path: Option<NormalizedPath>,
    pub warning_threshold: Option<usize>,
    pub strict: Option<bool>,
    pub allow_zero_lintable_files: Option<bool>,
    pub check_for_updates: Option<bool>,
    pub baseline: Option<NormalizedPath>,
    pub write_baseline: Option<NormalizedPath>,
    pub indentation: Option<Indentation>,
}

impl Configuration {
    /// Policy of an empty document rooted at `root_directory`.
    pub fn empty(root_directory: NormalizedPath) -> Self {
        Self {
            rules: RulesWrapper::default(),
            root_directory,
            included: Vec::new(),
            excluded: Vec::new(),
            reporter: None,
            cache_path: None,
            warning_threshold: None,
            strict: None,
            allow_zero_lintable_files: None,
            check_for_updates: None,
            baseline: None,
            write_baseline: None,
            indentation: None,
        }
    }

    /// Parse one document.
    ///
    /// `origin` names the document in diagnostics; relative paths resolve
    /// against `root_directory`.
    pub fn from_document(
        document: &ConfigValue,
        origin: &str,
        root_directory: &NormalizedPath,
        ctx: ParseContext<'_>,
    ) -> Result<Self> {
        let empty = ConfigValue::Map(Default::default());
        let document = match document {
            ConfigValue::Null => &empty,
            ConfigValue::Map(_) => document,
            other => {
                return Err(Error::InvalidYaml {
                    origin: origin.to_string(),
                    message: format!("expected a map at the top level, found {}", other.kind()),
                });
            }
        };
        let decode_err = |e: DecodeError| Error::decode(origin, e);
        let list = |key: ConfigKey| document.string_list_field(key.as_str()).map_err(decode_err);
        let path = |key: ConfigKey| -> Result<Option<NormalizedPath>> {
            Ok(document
                .field::<String>(key.as_str())
                .map_err(decode_err)?
                .map(|p| NormalizedPath::new(p).absolutize(root_directory)))
        };

        let mut opt_in_rules = list(ConfigKey::OptInRules)?;
        let enabled_rules = list(ConfigKey::EnabledRules)?;
        if !enabled_rules.is_empty() {
            ctx.session.warn_once(
                "deprecated-key:enabled_rules",
                "'enabled_rules' has been renamed to 'opt_in_rules' and will be completely removed in a future release.",
            );
            opt_in_rules.extend(enabled_rules);
        }

        let custom_rules = match document.get(CUSTOM_RULES) {
            Some(value) if !value.is_null() => {
                CustomRuleConfig::all_from_config(value).map_err(decode_err)?
            }
            _ => Vec::new(),
        };

        let lists = RuleLists {
            enable_all_rules: ctx.enable_all_rules,
            only_rules: list(ConfigKey::OnlyRules)?,
            opt_in_rules,
            disabled_rules: list(ConfigKey::DisabledRules)?,
            analyzer_rules: list(ConfigKey::AnalyzerRules)?,
        };
        let mode = RulesMode::make(
            &lists,
            Namespace {
                catalog: ctx.catalog,
                custom_rules: None,
            },
            ctx.session,
        )?;
        let rule_configs = RuleConfigs::from_document(document, origin, ctx.catalog, ctx.session)?;

        if let Some(requirement) = document
            .field::<String>(ConfigKey::ToolVersion.as_str())
            .map_err(decode_err)?
        {
            check_version(&requirement, origin, ctx)?;
        }

        let paths = |key: ConfigKey| -> Result<Vec<NormalizedPath>> {
            Ok(list(key)?
                .into_iter()
                .map(|p| NormalizedPath::new(p).absolutize(root_directory))
                .collect())
        };

        Ok(Self {
            rules: RulesWrapper::new(mode, rule_configs, custom_rules),
            root_directory: root_directory.clone(),
            included: paths(ConfigKey::Included)?,
            excluded: paths(ConfigKey::Excluded)?,
            reporter: document
                .field(ConfigKey::Reporter.as_str())
                .map_err(decode_err)?,
            cache_path: path(ConfigKey::CachePath)?,
            warning_threshold: document
                .field(ConfigKey::WarningThreshold.as_str())
                .map_err(decode_err)?,
            strict: document.field(ConfigKey::Strict.as_str()).map_err(decode_err)?,
            allow_zero_lintable_files: document
                .field(ConfigKey::AllowZeroLintableFiles.as_str())
                .map_err(decode_err)?,
            check_for_updates: document
                .field(ConfigKey::CheckForUpdates.as_str())
                .map_err(decode_err)?,
            baseline: path(ConfigKey::Baseline)?,
            write_baseline: path(ConfigKey::WriteBaseline)?,
            indentation: document
                .field(ConfigKey::Indentation.as_str())
                .map_err(decode_err)?,
        })
    }

    /// Combine `self` (the parent) with `child`; the child dominates.
    pub fn merged(&self, child: &Self, catalog: &RuleCatalog) -> Self {
        let warning_threshold = match (self.warning_threshold, child.warning_threshold) {
            (Some(parent), Some(child)) => Some(parent.min(child)),
            (parent, child) => child.or(parent),
        };

        Self {
            rules: self.rules.merged(&child.rules, catalog),
            root_directory: child.root_directory.clone(),
            included: concat(&self.included, &child.included),
            excluded: concat(&self.excluded, &child.excluded),
            reporter: child.reporter.clone().or_else(|| self.reporter.clone()),
            cache_path: child.cache_path.clone().or_else(|| self.cache_path.clone()),
            warning_threshold,
            strict: child.strict.or(self.strict),
            allow_zero_lintable_files: child.allow_zero_lintable_files.or(self.allow_zero_lintable_files),
            check_for_updates: child.check_for_updates.or(self.check_for_updates),
            baseline: child.baseline.clone().or_else(|| self.baseline.clone()),
            write_baseline: child.write_baseline.clone().or_else(|| self.write_baseline.clone()),
            indentation: child.indentation.or(self.indentation),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    pub fn allows_zero_lintable_files(&self) -> bool {
        self.allow_zero_lintable_files.unwrap_or(false)
    }

    /// Stable identifier of this policy.
    ///
    /// Derived from the activation mode, every active rule with the
    /// configuration it will run with, and the include/exclude paths.
    pub fn fingerprint(&self, catalog: &RuleCatalog) -> String {
        let rules: Vec<(String, Option<ConfigValue>)> = self
            .rules
            .active_identifiers(catalog)
            .into_iter()
            .map(|id| {
                let config = self.rules.config_for(&id);
                (id, config)
            })
            .collect();
        let description = serde_json::json!({
            "mode": self.rules.mode,
            "rules": rules,
            "included": self.included.iter().map(NormalizedPath::as_str).collect::<Vec<_>>(),
            "excluded": self.excluded.iter().map(NormalizedPath::as_str).collect::<Vec<_>>(),
        });
        checksum::compute_content_checksum(&description.to_string())
    }

    /// Compile `included`/`excluded` into a matcher.
    pub fn path_filter(&self) -> Result<PathFilter> {
        Ok(PathFilter {
            included: compile_all(&self.included)?,
            excluded: compile_all(&self.excluded)?,
        })
    }
}

fn concat(parent: &[NormalizedPath], child: &[NormalizedPath]) -> Vec<NormalizedPath> {
    let mut all = parent.to_vec();
    for path in child {
        if !all.contains(path) {
            all.push(path.clone());
        }
    }
    all
}

fn check_version(requirement: &str, origin: &str, ctx: ParseContext<'_>) -> Result<()> {
    let req = VersionReq::parse(requirement).map_err(|e| {
        Error::decode(
            origin,
            DecodeError::invalid(ConfigKey::ToolVersion.as_str(), e.to_string()),
        )
    })?;
    if !req.matches(ctx.tool_version) {
        ctx.session.warn_once(
            format!("version-mismatch:{requirement}"),
            format!(
                "Currently running version {} but configuration at {origin} requires {requirement}",
                ctx.tool_version
            ),
        );
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum PathMatcher {
    Prefix(NormalizedPath),
    Glob(GlobMatcher),
}

impl PathMatcher {
    fn matches(&self, path: &NormalizedPath) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix),
            Self::Glob(glob) => {
                let mut current = Some(path.clone());
                while let Some(candidate) = current {
                    if glob.is_match(candidate.as_str()) {
                        return true;
                    }
                    current = candidate.parent();
                }
                false
            }
        }
    }
}

fn compile_all(paths: &[NormalizedPath]) -> Result<Vec<PathMatcher>> {
    paths
        .iter()
        .map(|path| {
            if path.as_str().contains(['*', '?', '[']) {
                Glob::new(path.as_str())
                    .map(|g| PathMatcher::Glob(g.compile_matcher()))
                    .map_err(|e| Error::generic(format!("Invalid path pattern '{path}': {e}")))
            } else {
                Ok(PathMatcher::Prefix(path.clone()))
            }
        })
        .collect()
}

/// Decides whether a file falls under a policy's `included`/`excluded` paths.
#[derive(Debug, Clone)]
pub struct PathFilter {
    included: Vec<PathMatcher>,
    excluded: Vec<PathMatcher>,
}

impl PathFilter {
    /// Whether any `included` entry was declared.
    pub fn has_includes(&self) -> bool {
        !self.included.is_empty()
    }

    pub fn is_excluded(&self, path: &NormalizedPath) -> bool {
        self.excluded.iter().any(|m| m.matches(path))
    }

    pub fn is_lintable(&self, path: &NormalizedPath) -> bool {
        let included = self.included.is_empty() || self.included.iter().any(|m| m.matches(path));
        included && !self.is_excluded(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_test_utils::catalog::sample_catalog;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str, root: &str) -> Result<Configuration> {
        let catalog = sample_catalog();
        let session = WarningSession::new();
        let version = Version::new(0, 1, 0);
        let ctx = ParseContext {
            catalog: &catalog,
            session: &session,
            enable_all_rules: false,
            tool_version: &version,
        };
        Configuration::from_document(
            &ConfigValue::from_yaml_str(yaml).unwrap(),
            "test.yml",
            &NormalizedPath::new(root),
            ctx,
        )
    }

    #[test]
    fn parses_scalar_settings() {
        let config = parse(
            "reporter: json\nwarning_threshold: 10\nstrict: true\nindentation: tabs\ncache_path: .cache\nincluded: [src]\nexcluded: ['src/gen/**']\n",
            "/repo",
        )
        .unwrap();

        assert_eq!(config.reporter.as_deref(), Some("json"));
        assert_eq!(config.warning_threshold, Some(10));
        assert!(config.is_strict());
        assert_eq!(config.indentation, Some(Indentation::Tabs));
        assert_eq!(config.cache_path, Some(NormalizedPath::new("/repo/.cache")));
        assert_eq!(config.included, vec![NormalizedPath::new("/repo/src")]);
    }

    #[test]
    fn top_level_list_is_rejected() {
        assert!(matches!(
            parse("- a\n- b\n", "/repo"),
            Err(Error::InvalidYaml { .. })
        ));
    }

    #[test]
    fn empty_document_is_default_policy() {
        let config = parse("", "/repo").unwrap();
        assert_eq!(config, Configuration::empty(NormalizedPath::new("/repo")));
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        let err = parse("warning_threshold: lots\n", "/repo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration at test.yml: 'warning_threshold' should be an integer, found a string"
        );
    }

    #[test]
    fn merge_takes_minimum_threshold_and_child_overrides() {
        let catalog = sample_catalog();
        let parent = parse("warning_threshold: 5\nreporter: xcode\nstrict: true\n", "/repo").unwrap();
        let child = parse("warning_threshold: 9\nstrict: false\nexcluded: [vendor]\n", "/repo/app").unwrap();

        let merged = parent.merged(&child, &catalog);
        assert_eq!(merged.warning_threshold, Some(5));
        assert_eq!(merged.reporter.as_deref(), Some("xcode"));
        assert!(!merged.is_strict());
        assert_eq!(merged.excluded, vec![NormalizedPath::new("/repo/app/vendor")]);
        assert_eq!(merged.root_directory, NormalizedPath::new("/repo/app"));
    }

    #[test]
    fn fingerprint_tracks_rule_configuration() {
        let catalog = sample_catalog();
        let a = parse("line_length: 80\n", "/repo").unwrap();
        let b = parse("line_length: 80\n", "/repo").unwrap();
        let c = parse("line_length: 100\n", "/repo").unwrap();
        let d = parse("disabled_rules: [todo]\n", "/repo").unwrap();

        assert_eq!(a.fingerprint(&catalog), b.fingerprint(&catalog));
        assert_ne!(a.fingerprint(&catalog), c.fingerprint(&catalog));
        assert_ne!(a.fingerprint(&catalog), d.fingerprint(&catalog));
    }

    #[test]
    fn path_filter_prefix_and_glob() {
        let config = parse("included: [src]\nexcluded: ['src/**/generated']\n", "/repo").unwrap();
        let filter = config.path_filter().unwrap();

        assert!(filter.is_lintable(&NormalizedPath::new("/repo/src/main.rs")));
        assert!(!filter.is_lintable(&NormalizedPath::new("/repo/src/a/generated/x.rs")));
        assert!(!filter.is_lintable(&NormalizedPath::new("/repo/tests/t.rs")));
    }

    #[test]
    fn version_mismatch_warns() {
        let catalog = sample_catalog();
        let session = WarningSession::new();
        let version = Version::new(0, 1, 0);
        let ctx = ParseContext {
            catalog: &catalog,
            session: &session,
            enable_all_rules: false,
            tool_version: &version,
        };
        Configuration::from_document(
            &ConfigValue::from_yaml_str("swiftlint_version: '>=2.0'\n").unwrap(),
            "test.yml",
            &NormalizedPath::new("/repo"),
            ctx,
        )
        .unwrap();
        assert_eq!(session.warnings().len(), 1);
    }
}
