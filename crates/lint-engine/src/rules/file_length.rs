use lint_rules::{ConfigValue, DecodeError, Location, Rule, RuleDescriptor, RuleStorage, SourceFile, Violation};

use super::SeverityLevels;

const DEFAULT_LEVELS: SeverityLevels = SeverityLevels::new(400, Some(1000));

/// Files should not span too many lines.
#[derive(Debug, Clone)]
pub struct FileLength {
    descriptor: RuleDescriptor,
    levels: SeverityLevels,
    ignore_comment_only_lines: bool,
}

impl FileLength {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new("file_length", "File Length")
            .with_description("Files should not span too many lines")
            .opt_in()
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        let ignore_comment_only_lines = match config {
            Some(value @ ConfigValue::Map(_)) => value.field("ignore_comment_only_lines")?.unwrap_or(false),
            _ => false,
        };
        let levels = SeverityLevels::from_config(config, &descriptor.identifier, DEFAULT_LEVELS)?;
        Ok(Self {
            descriptor,
            levels,
            ignore_comment_only_lines,
        })
    }
}

fn is_comment_only(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

impl Rule for FileLength {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        let count = file
            .lines()
            .iter()
            .filter(|line| !(self.ignore_comment_only_lines && is_comment_only(line)))
            .count();
        let Some((severity, limit)) = self.levels.severity_for(count) else {
            return Vec::new();
        };
        vec![Violation::new(
            &self.descriptor.identifier,
            severity,
            Location::new(file.display_path(), file.lines().len(), Some(1)),
            format!("File should contain {limit} lines or less: currently contains {count}"),
        )]
    }
}
