//! Whole-pipeline scenarios: configuration files on disk, loader, linter
//!
//! Rules come from the counting test catalog, whose marker rules report
//! `VIOLATE(<id>)` wherever it appears.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use lint_config::{Configuration, ConfigurationLoader, LoadOptions, OfflineFetcher, WarningSession};
use lint_engine::{Linter, LinterCache, read_source_files};
use lint_rules::{RuleCatalog, SUPERFLUOUS_DISABLE_COMMAND, Violation};
use lint_test_utils::catalog::{counting_catalog, marker};
use lint_test_utils::tree::ConfigTree;
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn load(tree: &ConfigTree, catalog: &RuleCatalog) -> Configuration {
    let session = WarningSession::new();
    ConfigurationLoader::new(catalog, &session, tree.normalized_root(), Arc::new(OfflineFetcher))
        .load(&LoadOptions::default())
        .unwrap()
}

fn lint(tree: &ConfigTree, catalog: &RuleCatalog, file: &str, cache: Option<&LinterCache>) -> Vec<Violation> {
    let config = load(tree, catalog);
    let session = WarningSession::new();
    let mut linter = Linter::new(catalog, &config, &session).unwrap();
    if let Some(cache) = cache {
        linter = linter.with_cache(cache);
    }
    linter.lint(&read_source_files(&[tree.normalized_root().join(file)]))
}

fn lines(violations: &[Violation], rule: &str) -> Vec<usize> {
    violations
        .iter()
        .filter(|v| v.rule_id == rule)
        .map(|v| v.location.line)
        .collect()
}

// =============================================================================
// Suppression
// =============================================================================

#[test]
fn test_disable_next_covers_only_the_next_line() {
    let source = format!("fn a() {{}}\n\n// lint:disable:next todo\n{0}\n{0}\n", marker("todo"));
    let tree = ConfigTree::new().with_file("a.rs", &source);
    let (catalog, _) = counting_catalog();

    let violations = lint(&tree, &catalog, "a.rs", None);
    assert_eq!(lines(&violations, "todo"), vec![5]);
    assert!(lines(&violations, SUPERFLUOUS_DISABLE_COMMAND).is_empty());
}

#[test]
fn test_unused_file_wide_disable_is_superfluous() {
    let tree = ConfigTree::new().with_file("a.rs", "// lint:disable todo\nfn a() {}\nfn b() {}\n");
    let (catalog, _) = counting_catalog();

    let violations = lint(&tree, &catalog, "a.rs", None);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id, SUPERFLUOUS_DISABLE_COMMAND);
    assert_eq!(violations[0].location.line, 1);
    assert!(violations[0].reason.contains("'todo'"));
}

#[test]
fn test_used_file_wide_disable_is_not_superfluous() {
    let source = format!("// lint:disable todo\nfn a() {{}}\n{}\n", marker("todo"));
    let tree = ConfigTree::new().with_file("a.rs", &source);
    let (catalog, _) = counting_catalog();

    assert!(lint(&tree, &catalog, "a.rs", None).is_empty());
}

#[test]
fn test_superfluous_check_can_itself_be_disabled() {
    let tree = ConfigTree::new().with_file(
        "a.rs",
        &format!("// lint:disable {SUPERFLUOUS_DISABLE_COMMAND}\n// lint:disable todo\nfn a() {{}}\n"),
    );
    let (catalog, _) = counting_catalog();

    assert!(lint(&tree, &catalog, "a.rs", None).is_empty());
}

#[test]
fn test_unknown_identifier_in_disable_is_reported() {
    let tree = ConfigTree::new().with_file("a.rs", "// lint:disable no_such_rule\nfn a() {}\n");
    let (catalog, _) = counting_catalog();

    let violations = lint(&tree, &catalog, "a.rs", None);
    assert_eq!(violations.len(), 1);
    assert!(violations[0].reason.contains("'no_such_rule' is not a valid rule"));
}

#[test]
fn test_shebang_line_is_never_reported() {
    let source = format!("#!/usr/bin/env run {0}\n{0}\n", marker("todo"));
    let tree = ConfigTree::new().with_file("script", &source);
    let (catalog, _) = counting_catalog();

    assert_eq!(lines(&lint(&tree, &catalog, "script", None), "todo"), vec![2]);
}

#[test]
fn test_disable_on_shebang_line_counts_as_used() {
    let source = format!("#!/usr/bin/env run {} // lint:disable:this todo\nclean\n", marker("todo"));
    let tree = ConfigTree::new().with_file("script", &source);
    let (catalog, _) = counting_catalog();

    assert!(lint(&tree, &catalog, "script", None).is_empty());
}

#[test]
fn test_superfluous_disable_on_shebang_line_is_not_reported() {
    let tree = ConfigTree::new().with_file("script", "#!/usr/bin/env run // lint:disable:this todo\nclean\n");
    let (catalog, _) = counting_catalog();

    assert!(lint(&tree, &catalog, "script", None).is_empty());
}

// =============================================================================
// Policy from the hierarchy
// =============================================================================

#[test]
fn test_parent_opt_in_disabled_by_child_does_not_run() {
    let source = format!("{}\n{}\n", marker("explicit_type"), marker("file_header"));
    let tree = ConfigTree::new()
        .with_file("base.yml", "opt_in_rules: [explicit_type, file_header]\n")
        .with_file(".lint.yml", "parent_config: base.yml\ndisabled_rules: [explicit_type]\n")
        .with_file("a.rs", &source);
    let (catalog, _) = counting_catalog();

    let violations = lint(&tree, &catalog, "a.rs", None);
    assert!(lines(&violations, "explicit_type").is_empty());
    assert_eq!(lines(&violations, "file_header"), vec![2]);
}

#[test]
fn test_child_severity_overrides_parent() {
    let tree = ConfigTree::new()
        .with_file("base.yml", "todo: error\n")
        .with_file(".lint.yml", "parent_config: base.yml\ntodo: warning\n")
        .with_file("a.rs", &format!("{}\n", marker("todo")));
    let (catalog, _) = counting_catalog();

    let violations = lint(&tree, &catalog, "a.rs", None);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, lint_rules::Severity::Warning);
}

// =============================================================================
// Result cache
// =============================================================================

#[test]
fn test_unmodified_file_is_served_from_cache() {
    let tree = ConfigTree::new()
        .with_file(".lint.yml", "opt_in_rules: [file_header]\n")
        .with_file("a.rs", &format!("{}\n", marker("file_header")));
    let (catalog, invocations) = counting_catalog();
    let cache_dir = tree.normalized_root().join(".cache");

    let cache = LinterCache::new(cache_dir.clone(), "1.0.0");
    let first = lint(&tree, &catalog, "a.rs", Some(&cache));
    cache.save().unwrap();
    let after_first = invocations.load(Ordering::SeqCst);

    let reopened = LinterCache::new(cache_dir, "1.0.0");
    let second = lint(&tree, &catalog, "a.rs", Some(&reopened));
    assert_eq!(second, first);
    assert_eq!(invocations.load(Ordering::SeqCst), after_first);

    tree.touch("a.rs");
    let third = lint(&tree, &catalog, "a.rs", Some(&reopened));
    assert_eq!(third, first);
    assert!(invocations.load(Ordering::SeqCst) > after_first);
}

#[test]
fn test_new_tool_version_misses_cache() {
    let tree = ConfigTree::new().with_file("a.rs", &format!("{}\n", marker("todo")));
    let (catalog, invocations) = counting_catalog();
    let cache_dir = tree.normalized_root().join(".cache");

    let old = LinterCache::new(cache_dir.clone(), "1.0.0");
    lint(&tree, &catalog, "a.rs", Some(&old));
    old.save().unwrap();
    let before = invocations.load(Ordering::SeqCst);

    let upgraded = LinterCache::new(cache_dir, "1.1.0");
    lint(&tree, &catalog, "a.rs", Some(&upgraded));
    assert!(invocations.load(Ordering::SeqCst) > before);
}
