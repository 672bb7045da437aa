//! Configuration hierarchy scenarios
//!
//! Drives [`ConfigurationLoader`] over real files and a scripted network to
//! check how documents are discovered, merged and cached.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lint_config::{
    Configuration, ConfigurationLoader, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_IF_CACHED, Error, FetchError, LoadOptions,
    OfflineFetcher, ParseContext, RemoteFetcher, RulesMode, Version, WarningSession, resolve_alias,
};
use lint_rules::{ConfigValue, RuleCatalog};
use lint_test_utils::catalog::sample_catalog;
use lint_test_utils::tree::ConfigTree;
use pretty_assertions::assert_eq;

const BASE_URL: &str = "https://example.com/team/base.yml";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Network stand-in that serves one document until it is taken offline.
struct ScriptedFetcher {
    body: String,
    online: Mutex<bool>,
    requests: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedFetcher {
    fn serving(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            online: Mutex::new(true),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn go_offline(&self) {
        *self.online.lock().unwrap() = false;
    }

    fn timeouts(&self) -> Vec<Duration> {
        self.requests.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl RemoteFetcher for ScriptedFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push((url.to_string(), timeout));
        if *self.online.lock().unwrap() {
            Ok(self.body.clone())
        } else {
            Err(FetchError::Network("offline".to_string()))
        }
    }
}

fn load_with(
    tree: &ConfigTree,
    catalog: &RuleCatalog,
    session: &WarningSession,
    fetcher: Arc<dyn RemoteFetcher>,
    configs: &[&str],
) -> lint_config::Result<Configuration> {
    let loader = ConfigurationLoader::new(catalog, session, tree.normalized_root(), fetcher);
    loader.load(&LoadOptions {
        config_paths: configs.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    })
}

fn load(tree: &ConfigTree, catalog: &RuleCatalog, configs: &[&str]) -> lint_config::Result<Configuration> {
    load_with(tree, catalog, &WarningSession::new(), Arc::new(OfflineFetcher), configs)
}

fn active(config: &Configuration, catalog: &RuleCatalog) -> Vec<String> {
    config.rules.active_identifiers(catalog).into_iter().collect()
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_single_document_matches_direct_construction() {
    let yaml = "disabled_rules: [todo]\nopt_in_rules: [file_header]\nline_length: 100\nexcluded: [build]\n";
    let tree = ConfigTree::new().with_file(".lint.yml", yaml);
    let catalog = sample_catalog();

    let loaded = load(&tree, &catalog, &[]).unwrap();

    let session = WarningSession::new();
    let version = Version::new(0, 0, 0);
    let ctx = ParseContext {
        catalog: &catalog,
        session: &session,
        enable_all_rules: false,
        tool_version: &version,
    };
    let direct = Configuration::from_document(
        &ConfigValue::from_yaml_str(yaml).unwrap(),
        "direct",
        &tree.normalized_root(),
        ctx,
    )
    .unwrap();
    assert_eq!(loaded, direct);
}

#[test]
fn test_no_document_is_default_policy() {
    let tree = ConfigTree::new();
    let catalog = sample_catalog();
    let config = load(&tree, &catalog, &[]).unwrap();
    assert_eq!(config.rules.mode, RulesMode::default());
    assert_eq!(active(&config, &catalog), vec!["line_length", "todo", "trailing_whitespace"]);
}

#[test]
fn test_mutual_references_fail_with_cycle() {
    let tree = ConfigTree::new()
        .with_file("a.yml", "child_config: b.yml\n")
        .with_file("b.yml", "parent_config: a.yml\n");
    let catalog = sample_catalog();
    assert!(matches!(load(&tree, &catalog, &["a.yml"]), Err(Error::CycleDetected { .. })));
}

#[test]
fn test_missing_explicit_config_is_not_found() {
    let tree = ConfigTree::new();
    let catalog = sample_catalog();
    assert!(matches!(load(&tree, &catalog, &["nope.yml"]), Err(Error::FileNotFound { .. })));
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn test_child_disable_beats_parent_opt_in() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "opt_in_rules: [file_header, explicit_type]\n")
        .with_file(".lint.yml", "parent_config: base.yml\ndisabled_rules: [file_header]\n");
    let catalog = sample_catalog();

    let config = load(&tree, &catalog, &[]).unwrap();
    let active = active(&config, &catalog);
    assert!(!active.contains(&"file_header".to_string()));
    assert!(active.contains(&"explicit_type".to_string()));
}

#[test]
fn test_later_command_line_config_wins() {
    let tree = ConfigTree::new()
        .with_file("first.yml", "line_length: 80\ndisabled_rules: [todo]\n")
        .with_file("second.yml", "line_length: 120\n");
    let catalog = sample_catalog();

    let config = load(&tree, &catalog, &["first.yml", "second.yml"]).unwrap();
    assert_eq!(config.rules.config_for("line_length"), Some(ConfigValue::Int(120)));
    assert!(!active(&config, &catalog).contains(&"todo".to_string()));
}

#[test]
fn test_child_only_rules_override_parent_mode() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "opt_in_rules: [file_header]\n")
        .with_file(".lint.yml", "parent_config: base.yml\nonly_rules: [todo]\n");
    let catalog = sample_catalog();

    let config = load(&tree, &catalog, &[]).unwrap();
    assert_eq!(active(&config, &catalog), vec!["todo"]);
}

#[test]
fn test_aliases_resolve_idempotently_across_documents() {
    let catalog = sample_catalog();
    let session = WarningSession::new();

    let once = resolve_alias(&catalog, "whitespace_at_eol", &session);
    let twice = resolve_alias(&catalog, &once, &session);
    assert_eq!(once, "trailing_whitespace");
    assert_eq!(twice, once);
    assert_eq!(resolve_alias(&catalog, "whitespace_at_eol", &session), once);
    assert_eq!(session.warnings().len(), 1);

    let tree = ConfigTree::new()
        .with_file("base.yml", "disabled_rules: [whitespace_at_eol]\n")
        .with_file(".lint.yml", "parent_config: base.yml\n");
    let config = load(&tree, &catalog, &[]).unwrap();
    assert!(!active(&config, &catalog).contains(&"trailing_whitespace".to_string()));
}

fn active_custom(config: &Configuration) -> Vec<&str> {
    config
        .rules
        .active_custom_rules()
        .map(|r| r.identifier.as_str())
        .collect()
}

#[test]
fn test_child_disables_custom_rule_declared_by_parent() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "custom_rules:\n  no_print:\n    regex: print\n  no_dbg:\n    regex: dbg\n")
        .with_file(".lint.yml", "parent_config: base.yml\ndisabled_rules: [no_print]\n");
    let catalog = sample_catalog();
    let session = WarningSession::new();

    let config = load_with(&tree, &catalog, &session, Arc::new(OfflineFetcher), &[]).unwrap();
    assert_eq!(active_custom(&config), vec!["no_dbg"]);
    assert!(session.warnings().is_empty());
}

#[test]
fn test_child_only_rules_select_parent_custom_rule() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "custom_rules:\n  no_print:\n    regex: print\n  no_dbg:\n    regex: dbg\n")
        .with_file(".lint.yml", "parent_config: base.yml\nonly_rules: [no_print, todo]\n");
    let catalog = sample_catalog();
    let session = WarningSession::new();

    let config = load_with(&tree, &catalog, &session, Arc::new(OfflineFetcher), &[]).unwrap();
    assert_eq!(active_custom(&config), vec!["no_print"]);
    assert!(session.warnings().is_empty());
}

#[test]
fn test_parent_disables_custom_rule_declared_by_child() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "disabled_rules: [no_print]\n")
        .with_file(".lint.yml", "parent_config: base.yml\ncustom_rules:\n  no_print:\n    regex: print\n");
    let catalog = sample_catalog();
    let session = WarningSession::new();

    let config = load_with(&tree, &catalog, &session, Arc::new(OfflineFetcher), &[]).unwrap();
    assert!(active_custom(&config).is_empty());
    assert!(session.warnings().is_empty());
}

#[test]
fn test_identifier_unknown_to_whole_hierarchy_warns() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "custom_rules:\n  no_print:\n    regex: print\n")
        .with_file(".lint.yml", "parent_config: base.yml\ndisabled_rules: [no_such_rule]\n");
    let catalog = sample_catalog();
    let session = WarningSession::new();

    let config = load_with(&tree, &catalog, &session, Arc::new(OfflineFetcher), &[]).unwrap();
    assert_eq!(
        config.rules.mode,
        RulesMode::Default {
            disabled: Default::default(),
            opt_in: Default::default(),
        }
    );
    assert_eq!(session.warnings().len(), 1);
    assert!(session.warnings()[0].starts_with("'no_such_rule' is not a valid rule identifier"));
}

// =============================================================================
// Remote configurations
// =============================================================================

#[test]
fn test_remote_parent_falls_back_to_cache() {
    let tree = ConfigTree::new().with_file(".lint.yml", &format!("parent_config: {BASE_URL}\n"));
    let catalog = sample_catalog();
    let fetcher = ScriptedFetcher::serving("disabled_rules: [todo]\nline_length: 90\n");

    let online_session = WarningSession::new();
    let online = load_with(&tree, &catalog, &online_session, fetcher.clone(), &[]).unwrap();
    assert!(online_session.warnings().is_empty());
    assert!(!active(&online, &catalog).contains(&"todo".to_string()));

    fetcher.go_offline();
    let offline_session = WarningSession::new();
    let offline = load_with(&tree, &catalog, &offline_session, fetcher.clone(), &[]).unwrap();
    assert_eq!(offline, online);
    assert_eq!(offline_session.warnings().len(), 1);
    assert!(offline_session.warnings()[0].contains("Using cached version"));

    assert_eq!(fetcher.timeouts(), vec![DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_IF_CACHED]);
}

#[test]
fn test_remote_failure_without_cache_is_fatal() {
    let tree = ConfigTree::new().with_file(".lint.yml", &format!("parent_config: {BASE_URL}\n"));
    let catalog = sample_catalog();
    let fetcher = ScriptedFetcher::serving("");
    fetcher.go_offline();

    let result = load_with(&tree, &catalog, &WarningSession::new(), fetcher, &[]);
    assert!(matches!(result, Err(Error::RemoteFetch { .. })));
}

#[test]
fn test_remote_cache_is_gitignored() {
    let tree = ConfigTree::new().with_file(".lint.yml", &format!("parent_config: {BASE_URL}\n"));
    let catalog = sample_catalog();
    let fetcher = ScriptedFetcher::serving("opt_in_rules: [file_header]\n");

    load_with(&tree, &catalog, &WarningSession::new(), fetcher.clone(), &[]).unwrap();
    load_with(&tree, &catalog, &WarningSession::new(), fetcher, &[]).unwrap();

    let gitignore = tree.read(".gitignore");
    assert_eq!(gitignore.matches(".swiftlint/RemoteConfigCache").count(), 1);
}

#[test]
fn test_remote_timeouts_apply_to_referenced_documents() {
    let tree = ConfigTree::new().with_file(
        ".lint.yml",
        &format!("parent_config: {BASE_URL}\nremote_timeout: 5\nremote_timeout_if_cached: 3\n"),
    );
    let catalog = sample_catalog();
    let fetcher = ScriptedFetcher::serving("");

    load_with(&tree, &catalog, &WarningSession::new(), fetcher.clone(), &[]).unwrap();
    load_with(&tree, &catalog, &WarningSession::new(), fetcher.clone(), &[]).unwrap();
    assert_eq!(fetcher.timeouts(), vec![Duration::from_secs(5), Duration::from_secs(3)]);
}
