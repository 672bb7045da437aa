//! End-to-end runs of the linter over files on disk

use std::sync::atomic::Ordering;

use lint_config::{Configuration, ParseContext, Version, WarningSession};
use lint_engine::{Baseline, Linter, LinterCache, Report, ReportFormat, builtin_catalog, read_source_files};
use lint_fs::NormalizedPath;
use lint_rules::{ConfigValue, RuleCatalog, SourceFile};
use lint_test_utils::catalog::{counting_catalog, marker};
use lint_test_utils::tree::ConfigTree;
use pretty_assertions::assert_eq;

fn configuration(catalog: &RuleCatalog, root: &NormalizedPath, yaml: &str) -> Configuration {
    let session = WarningSession::new();
    let version = Version::new(1, 0, 0);
    let ctx = ParseContext {
        catalog,
        session: &session,
        enable_all_rules: false,
        tool_version: &version,
    };
    Configuration::from_document(&ConfigValue::from_yaml_str(yaml).unwrap(), "test", root, ctx).unwrap()
}

fn sources(tree: &ConfigTree, files: &[&str]) -> Vec<SourceFile> {
    let root = tree.normalized_root();
    let paths: Vec<NormalizedPath> = files.iter().map(|f| root.join(f)).collect();
    read_source_files(&paths)
}

#[test]
fn test_cached_run_skips_rules() {
    let tree = ConfigTree::new().with_file("a.rs", &format!("{}\n", marker("todo")));
    let (catalog, invocations) = counting_catalog();
    let config = configuration(&catalog, &tree.normalized_root(), "");
    let session = WarningSession::new();
    let cache_dir = tree.normalized_root().join("cache");

    let first_cache = LinterCache::new(cache_dir.clone(), "1.0.0");
    let first = Linter::new(&catalog, &config, &session)
        .unwrap()
        .with_cache(&first_cache)
        .lint(&sources(&tree, &["a.rs"]));
    first_cache.save().unwrap();
    let after_first = invocations.load(Ordering::SeqCst);
    assert!(after_first > 0);

    let second_cache = LinterCache::new(cache_dir, "1.0.0");
    let linter = Linter::new(&catalog, &config, &session).unwrap().with_cache(&second_cache);
    let second = linter.lint(&sources(&tree, &["a.rs"]));
    assert_eq!(second, first);
    assert_eq!(invocations.load(Ordering::SeqCst), after_first);

    tree.touch("a.rs");
    let third = linter.lint(&sources(&tree, &["a.rs"]));
    assert_eq!(third, first);
    assert!(invocations.load(Ordering::SeqCst) > after_first);
}

#[test]
fn test_policy_change_is_a_cache_miss() {
    let tree = ConfigTree::new().with_file("a.rs", &format!("{}\n", marker("todo")));
    let (catalog, invocations) = counting_catalog();
    let session = WarningSession::new();
    let cache = LinterCache::in_memory("1.0.0");

    let lenient = configuration(&catalog, &tree.normalized_root(), "disabled_rules: [todo]\n");
    let strict = configuration(&catalog, &tree.normalized_root(), "");

    let first = Linter::new(&catalog, &lenient, &session)
        .unwrap()
        .with_cache(&cache)
        .lint(&sources(&tree, &["a.rs"]));
    assert!(first.is_empty());
    let before = invocations.load(Ordering::SeqCst);

    let second = Linter::new(&catalog, &strict, &session)
        .unwrap()
        .with_cache(&cache)
        .lint(&sources(&tree, &["a.rs"]));
    assert_eq!(second.len(), 1);
    assert!(invocations.load(Ordering::SeqCst) > before);
}

#[test]
fn test_correction_rewrites_and_invalidates() {
    let tree = ConfigTree::new().with_file("a.rs", "let a = 1;   \n");
    let catalog = builtin_catalog().unwrap();
    let config = configuration(&catalog, &tree.normalized_root(), "");
    let session = WarningSession::new();
    let cache = LinterCache::in_memory("1.0.0");
    let linter = Linter::new(&catalog, &config, &session).unwrap().with_cache(&cache);

    assert_eq!(linter.lint(&sources(&tree, &["a.rs"])).len(), 1);
    let corrected = linter.correct(&sources(&tree, &["a.rs"])).unwrap();
    assert_eq!(corrected, vec![tree.normalized_root().join("a.rs")]);
    assert_eq!(tree.read("a.rs"), "let a = 1;\n");
    assert!(linter.lint(&sources(&tree, &["a.rs"])).is_empty());
}

#[test]
fn test_baseline_hides_known_violations() {
    let tree = ConfigTree::new().with_file("a.rs", "// TODO: old\n");
    let root = tree.normalized_root();
    let catalog = builtin_catalog().unwrap();
    let config = configuration(&catalog, &root, "");
    let session = WarningSession::new();
    let linter = Linter::new(&catalog, &config, &session).unwrap();

    let baseline_path = root.join("baseline.json");
    Baseline::write(&baseline_path, &linter.lint(&sources(&tree, &["a.rs"])), &root).unwrap();

    tree.write("a.rs", "fn f() {}\n// TODO: old\n// TODO: new\n");
    let baseline = Baseline::load(&baseline_path).unwrap();
    let remaining = baseline.filter(&linter.lint(&sources(&tree, &["a.rs"])), &root);
    let reasons: Vec<&str> = remaining.iter().map(|v| v.reason.as_str()).collect();
    assert_eq!(reasons, vec!["TODOs should be resolved (new)"]);
}

#[test]
fn test_custom_rules_can_be_suppressed_by_identifier() {
    let tree = ConfigTree::new().with_file(
        "a.rs",
        "println!(\"a\");\n// lint:disable:next no_print\nprintln!(\"b\");\n",
    );
    let root = tree.normalized_root();
    let catalog = builtin_catalog().unwrap();
    let config = configuration(&catalog, &root, "custom_rules:\n  no_print:\n    regex: 'println!'\n");
    let session = WarningSession::new();
    let linter = Linter::new(&catalog, &config, &session).unwrap();

    let violations = linter.lint(&sources(&tree, &["a.rs"]));
    let found: Vec<(&str, usize)> = violations.iter().map(|v| (v.rule_id.as_str(), v.location.line)).collect();
    assert_eq!(found, vec![("no_print", 1)]);
}

#[test]
fn test_rendered_report() {
    let catalog = builtin_catalog().unwrap();
    let config = configuration(&catalog, &NormalizedPath::new("/repo"), "");
    let session = WarningSession::new();
    let linter = Linter::new(&catalog, &config, &session).unwrap();

    let source = "fn main() {  \n    // TODO: remove\n    let x = 1; // lint:disable:this todo\n}\n";
    let report = Report::new(linter.lint(&[SourceFile::from_contents(source)]), &config);
    let rendered = report.render(ReportFormat::Text).unwrap();

    insta::assert_snapshot!(rendered.trim_end(), @r"
    1:12: warning: Lines should not have trailing whitespace (trailing_whitespace)
    2:5: warning: TODOs should be resolved (remove) (todo)
    3: warning: Rule 'todo' did not trigger a violation in the disabled region; remove the disable command (superfluous_disable_command)
    ");
}
