use lint_rules::{
    CUSTOM_RULES, ConfigValue, CustomRuleConfig, DecodeError, Location, Rule, RuleDescriptor, RuleStorage, SourceFile,
    Violation,
};

/// Runs the regex rules declared under `custom_rules`.
///
/// Violations are reported under each custom rule's own identifier, so they
/// can be suppressed either by that identifier or by `custom_rules`.
#[derive(Debug, Clone)]
pub struct CustomRules {
    descriptor: RuleDescriptor,
    rules: Vec<CustomRuleConfig>,
}

impl CustomRules {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new(CUSTOM_RULES, "Custom Rules")
            .with_description("Create custom rules by providing a regex string")
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        let rules = match config {
            Some(value) if !value.is_null() => CustomRuleConfig::all_from_config(value)?,
            _ => Vec::new(),
        };
        Ok(Self { descriptor, rules })
    }
}

/// 1-based line and character of a byte offset.
fn position(line_starts: &[usize], contents: &str, offset: usize) -> (usize, usize) {
    let line = line_starts.partition_point(|start| *start <= offset);
    let start = line_starts[line - 1];
    (line, contents[start..offset].chars().count() + 1)
}

impl Rule for CustomRules {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        let path = file.display_path();
        let contents = file.contents();
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(contents.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();

        let mut violations = Vec::new();
        for rule in self.rules.iter().filter(|r| r.applies_to(path.as_deref())) {
            for found in rule.regex.find_iter(contents) {
                let (line, character) = position(&line_starts, contents, found.start());
                violations.push(Violation::new(
                    &rule.identifier,
                    rule.severity,
                    Location::new(path.clone(), line, Some(character)),
                    rule.reason(),
                ));
            }
        }
        violations
    }

    fn reported_identifiers(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.identifier.clone()).collect()
    }
}
