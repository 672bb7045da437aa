//! Stub rules and a catalog built from them.
//!
//! Marker rules report a violation wherever a line contains
//! `VIOLATE(<identifier>)`, so tests can place violations precisely without a
//! real analyzer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lint_rules::{
    ConfigValue, CUSTOM_RULES, DecodeError, Location, Rule, RuleCatalog, RuleDescriptor, RuleStorage,
    SUPERFLUOUS_DISABLE_COMMAND, Severity, SourceFile, Violation,
};

/// Marker text that makes the rule `identifier` report a violation.
pub fn marker(identifier: &str) -> String {
    format!("VIOLATE({identifier})")
}

/// Rule that reports every occurrence of its marker.
pub struct MarkerRule {
    descriptor: RuleDescriptor,
    severity: Severity,
    invocations: Arc<AtomicUsize>,
}

impl Rule for MarkerRule {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let needle = marker(&self.descriptor.identifier);
        file.lines()
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                line.find(&needle).map(|col| {
                    Violation::new(
                        &self.descriptor.identifier,
                        self.severity,
                        Location::new(file.display_path(), idx + 1, Some(col + 1)),
                        format!("Found {needle}"),
                    )
                })
            })
            .collect()
    }
}

/// Rule that collects each file's lines and flags lines repeated in another file.
pub struct DuplicateLineRule {
    descriptor: RuleDescriptor,
    invocations: Arc<AtomicUsize>,
}

impl Rule for DuplicateLineRule {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn collect(&self, file: &SourceFile, _storage: &RuleStorage) -> Option<serde_json::Value> {
        Some(serde_json::json!(file.lines()))
    }

    fn validate(&self, file: &SourceFile, storage: &RuleStorage) -> Vec<Violation> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let own = file.display_path().unwrap_or_default();
        let others: Vec<String> = storage
            .collected(&self.descriptor.identifier)
            .into_iter()
            .filter(|(path, _)| *path != own)
            .filter_map(|(_, lines)| serde_json::from_value::<Vec<String>>(lines).ok())
            .flatten()
            .collect();
        file.lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty() && others.contains(line))
            .map(|(idx, _)| {
                Violation::new(
                    &self.descriptor.identifier,
                    Severity::Warning,
                    Location::new(file.display_path(), idx + 1, None),
                    "Line is duplicated in another file",
                )
            })
            .collect()
    }
}

/// Rule that never reports anything.
pub struct SilentRule {
    descriptor: RuleDescriptor,
}

impl Rule for SilentRule {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, _file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        Vec::new()
    }
}

fn severity_of(config: Option<&ConfigValue>) -> Result<Severity, DecodeError> {
    match config {
        Some(value @ ConfigValue::Map(_)) => Ok(value.field("severity")?.unwrap_or(Severity::Warning)),
        Some(value @ ConfigValue::String(_)) => value.decode("severity"),
        _ => Ok(Severity::Warning),
    }
}

/// Descriptors of the marker rules in [`sample_catalog`].
pub fn marker_descriptors() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::new("line_length", "Line Length").parser_free(),
        RuleDescriptor::new("todo", "Todo").parser_free(),
        RuleDescriptor::new("trailing_whitespace", "Trailing Whitespace")
            .with_alias("whitespace_at_eol")
            .correctable()
            .parser_free(),
        RuleDescriptor::new("file_header", "File Header").opt_in(),
        RuleDescriptor::new("explicit_type", "Explicit Type").opt_in(),
        RuleDescriptor::new("unused_import", "Unused Import").analyzer_only(),
    ]
}

/// Catalog of stub rules plus the number of `validate` calls they received.
pub fn counting_catalog() -> (RuleCatalog, Arc<AtomicUsize>) {
    let invocations = Arc::new(AtomicUsize::new(0));
    let mut catalog = RuleCatalog::new();

    for descriptor in marker_descriptors() {
        let counter = invocations.clone();
        let rule_descriptor = descriptor.clone();
        catalog
            .register(descriptor, move |config| {
                Ok(Box::new(MarkerRule {
                    descriptor: rule_descriptor.clone(),
                    severity: severity_of(config)?,
                    invocations: counter.clone(),
                }) as Box<dyn Rule>)
            })
            .unwrap();
    }

    let duplicate = RuleDescriptor::new("duplicate_line", "Duplicate Line")
        .opt_in()
        .collecting();
    let counter = invocations.clone();
    let rule_descriptor = duplicate.clone();
    catalog
        .register(duplicate, move |_| {
            Ok(Box::new(DuplicateLineRule {
                descriptor: rule_descriptor.clone(),
                invocations: counter.clone(),
            }) as Box<dyn Rule>)
        })
        .unwrap();

    for descriptor in [
        RuleDescriptor::new(SUPERFLUOUS_DISABLE_COMMAND, "Superfluous Disable Command"),
        RuleDescriptor::new(CUSTOM_RULES, "Custom Rules"),
    ] {
        let rule_descriptor = descriptor.clone();
        catalog
            .register(descriptor, move |_| {
                Ok(Box::new(SilentRule {
                    descriptor: rule_descriptor.clone(),
                }) as Box<dyn Rule>)
            })
            .unwrap();
    }

    (catalog, invocations)
}

/// The standard test catalog.
///
/// | identifier | flags |
/// |------------|-------|
/// | `line_length`, `todo` | default |
/// | `trailing_whitespace` (alias `whitespace_at_eol`) | default, correctable |
/// | `file_header`, `explicit_type` | opt-in |
/// | `duplicate_line` | opt-in, collecting |
/// | `unused_import` | analyzer-only |
/// | `superfluous_disable_command`, `custom_rules` | meta, never report |
pub fn sample_catalog() -> RuleCatalog {
    counting_catalog().0
}
