//! End-to-end tests for the lint binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the lint binary running in `dir`
fn lint_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lint").expect("Failed to find lint binary");
    cmd.current_dir(dir.path()).env_remove("LINT_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    dir
}

// ============================================================================
// Basic invocation
// ============================================================================

#[test]
fn test_help_exits_zero() {
    let dir = project(&[]);
    lint_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--only-rule"))
        .stdout(predicate::str::contains("rules"));
}

#[test]
fn test_clean_project_exits_zero() {
    let dir = project(&[("src/main.rs", "fn main() {}\n")]);
    lint_cmd(&dir)
        .arg("--no-cache")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Found 0 violations"));
}

#[test]
fn test_warnings_alone_do_not_fail() {
    let dir = project(&[("src/main.rs", "fn main() {}   \n")]);
    lint_cmd(&dir)
        .arg("--no-cache")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("warning: Lines should not have trailing whitespace"));
}

#[test]
fn test_strict_fails_on_warnings() {
    let dir = project(&[("src/main.rs", "fn main() {}   \n")]);
    lint_cmd(&dir)
        .args(["--no-cache", "--strict"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("error: Lines should not have trailing whitespace"));
}

#[test]
fn test_no_lintable_files_is_an_error() {
    let dir = project(&[]);
    lint_cmd(&dir)
        .arg("--no-cache")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No lintable files found"));
}

#[test]
fn test_zero_lintable_files_can_be_allowed() {
    let dir = project(&[(".lint.yml", "allow_zero_lintable_files: true\n")]);
    lint_cmd(&dir).arg("--no-cache").assert().code(0);
}

// ============================================================================
// Configuration resolution
// ============================================================================

#[test]
fn test_default_config_disables_rule() {
    let dir = project(&[
        (".lint.yml", "disabled_rules: [trailing_whitespace]\n"),
        ("src/main.rs", "fn main() {}   \n"),
    ]);
    lint_cmd(&dir)
        .args(["--no-cache", "--strict"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = project(&[("src/main.rs", "fn main() {}\n")]);
    lint_cmd(&dir)
        .args(["--no-cache", "--config", "missing.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_only_rule_restricts_the_run() {
    let dir = project(&[("src/main.rs", "// TODO: later   \n")]);
    lint_cmd(&dir)
        .args(["--no-cache", "--only-rule", "todo"])
        .assert()
        .stdout(predicate::str::contains("(todo)"))
        .stdout(predicate::str::contains("trailing_whitespace").not());
}

#[test]
fn test_offline_remote_without_cache_fails() {
    let dir = project(&[
        (".lint.yml", "parent_config: https://example.invalid/base.yml\n"),
        ("src/main.rs", "fn main() {}\n"),
    ]);
    lint_cmd(&dir)
        .args(["--no-cache", "--offline"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_warning_threshold_fails_run() {
    let dir = project(&[
        (".lint.yml", "warning_threshold: 2\n"),
        ("src/main.rs", "let a = 1;  \nlet b = 2;  \n"),
    ]);
    lint_cmd(&dir)
        .arg("--no-cache")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Number of warnings exceeded threshold"));
}

// ============================================================================
// Output and side effects
// ============================================================================

#[test]
fn test_json_reporter() {
    let dir = project(&[("src/main.rs", "// TODO: later\n")]);
    let output = lint_cmd(&dir)
        .args(["--no-cache", "--reporter", "json"])
        .output()
        .unwrap();
    let violations: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(violations.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_fix_rewrites_file() {
    let dir = project(&[("src/main.rs", "fn main() {}   \n")]);
    lint_cmd(&dir)
        .args(["--no-cache", "--fix"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Corrected"));
    let contents = std::fs::read_to_string(dir.path().join("src/main.rs")).unwrap();
    assert_eq!(contents, "fn main() {}\n");
}

#[test]
fn test_baseline_round_trip() {
    let dir = project(&[("src/main.rs", "// TODO: later\n")]);
    lint_cmd(&dir)
        .args(["--no-cache", "--write-baseline", "baseline.json"])
        .assert()
        .stdout(predicate::str::contains("(todo)"));
    assert!(dir.path().join("baseline.json").exists());

    lint_cmd(&dir)
        .args(["--no-cache", "--baseline", "baseline.json"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_cache_directory_is_written() {
    let dir = project(&[("src/main.rs", "fn main() {}\n")]);
    lint_cmd(&dir)
        .args(["--cache-path", "cache"])
        .assert()
        .code(0);
    let blobs = std::fs::read_dir(dir.path().join("cache"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .count();
    assert_eq!(blobs, 1);
}

// ============================================================================
// rules command
// ============================================================================

#[test]
fn test_rules_lists_catalog() {
    let dir = project(&[]);
    lint_cmd(&dir)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("trailing_whitespace"))
        .stdout(predicate::str::contains("file_length"));
}

#[test]
fn test_rules_enabled_hides_opt_in() {
    let dir = project(&[]);
    lint_cmd(&dir)
        .args(["rules", "--enabled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line_length"))
        .stdout(predicate::str::contains("file_length").not());
}
