use std::sync::LazyLock;

use lint_rules::{ConfigValue, DecodeError, Location, Rule, RuleDescriptor, RuleStorage, Severity, SourceFile, Violation};
use regex::Regex;

use super::configured_severity;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?://|/\*|#)\s*\b(TODO|FIXME)\b(?:\(.*?\))?:?\s*(.*)").expect("todo pattern is a valid regex")
});

/// TODO and FIXME comments should be resolved.
#[derive(Debug, Clone)]
pub struct Todo {
    descriptor: RuleDescriptor,
    severity: Severity,
}

impl Todo {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new("todo", "Todo")
            .with_description("TODOs and FIXMEs should be resolved")
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        Ok(Self {
            severity: configured_severity(config, &descriptor.identifier, Severity::Warning)?,
            descriptor,
        })
    }
}

impl Rule for Todo {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines().iter().enumerate() {
            let Some(captures) = MARKER.captures(line) else {
                continue;
            };
            let (Some(kind), Some(all)) = (captures.get(1), captures.get(0)) else {
                continue;
            };
            let note = captures.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let reason = if note.is_empty() {
                format!("{}s should be resolved", kind.as_str())
            } else {
                format!("{}s should be resolved ({note})", kind.as_str())
            };
            violations.push(Violation::new(
                &self.descriptor.identifier,
                self.severity,
                Location::new(file.display_path(), idx + 1, Some(line[..all.start()].chars().count() + 1)),
                reason,
            ));
        }
        violations
    }
}
