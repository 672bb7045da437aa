use lint_rules::{ConfigValue, DecodeError, Location, Rule, RuleDescriptor, RuleStorage, Severity, SourceFile, Violation};

use super::configured_severity;

/// Lines should not end in whitespace.
#[derive(Debug, Clone)]
pub struct TrailingWhitespace {
    descriptor: RuleDescriptor,
    severity: Severity,
    ignores_empty_lines: bool,
}

impl TrailingWhitespace {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new("trailing_whitespace", "Trailing Whitespace")
            .with_description("Lines should not have trailing whitespace")
            .with_alias("whitespace_at_eol")
            .correctable()
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        let ignores_empty_lines = match config {
            Some(value @ ConfigValue::Map(_)) => value.field("ignores_empty_lines")?.unwrap_or(false),
            _ => false,
        };
        Ok(Self {
            severity: configured_severity(config, &descriptor.identifier, Severity::Warning)?,
            descriptor,
            ignores_empty_lines,
        })
    }

    fn offends(&self, line: &str) -> bool {
        let trimmed = line.trim_end();
        trimmed.len() != line.len() && !(self.ignores_empty_lines && trimmed.is_empty())
    }
}

impl Rule for TrailingWhitespace {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        file.lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| self.offends(line))
            .map(|(idx, line)| {
                Violation::new(
                    &self.descriptor.identifier,
                    self.severity,
                    Location::new(file.display_path(), idx + 1, Some(line.trim_end().chars().count() + 1)),
                    "Lines should not have trailing whitespace",
                )
            })
            .collect()
    }

    fn correct(&self, file: &SourceFile) -> Option<String> {
        if !file.lines().iter().any(|line| self.offends(line)) {
            return None;
        }
        let mut corrected: Vec<&str> = file
            .lines()
            .iter()
            .map(|line| if self.offends(line) { line.trim_end() } else { line.as_str() })
            .collect();
        if file.contents().ends_with('\n') {
            corrected.push("");
        }
        Some(corrected.join("\n"))
    }
}
