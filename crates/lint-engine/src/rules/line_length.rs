use lint_rules::{ConfigValue, DecodeError, Location, Rule, RuleDescriptor, RuleStorage, SourceFile, Violation};

use super::SeverityLevels;

const DEFAULT_LEVELS: SeverityLevels = SeverityLevels::new(120, Some(200));

/// Lines should not exceed a character count.
#[derive(Debug, Clone)]
pub struct LineLength {
    descriptor: RuleDescriptor,
    levels: SeverityLevels,
}

impl LineLength {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new("line_length", "Line Length")
            .with_description("Lines should not span too many characters")
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        Ok(Self {
            levels: SeverityLevels::from_config(config, &descriptor.identifier, DEFAULT_LEVELS)?,
            descriptor,
        })
    }
}

impl Rule for LineLength {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        file.lines()
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let length = line.chars().count();
                let (severity, limit) = self.levels.severity_for(length)?;
                Some(Violation::new(
                    &self.descriptor.identifier,
                    severity,
                    Location::new(file.display_path(), idx + 1, Some(length)),
                    format!("Line should be {limit} characters or less; currently it has {length} characters"),
                ))
            })
            .collect()
    }
}
