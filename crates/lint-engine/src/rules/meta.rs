use lint_rules::{
    ConfigValue, DecodeError, Rule, RuleDescriptor, RuleStorage, SUPERFLUOUS_DISABLE_COMMAND, Severity, SourceFile,
    Violation,
};

use super::configured_severity;

/// Flags suppression commands that suppress nothing or name unknown rules.
///
/// The rule itself never inspects a file. The linter builds its violations
/// from suppression regions once every other rule has run; instantiating it
/// only checks that its configured severity is valid.
#[derive(Debug, Clone)]
pub struct SuperfluousDisableCommand {
    descriptor: RuleDescriptor,
}

impl SuperfluousDisableCommand {
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new(SUPERFLUOUS_DISABLE_COMMAND, "Superfluous Disable Command")
            .with_description("Disable commands should only disable rules that would otherwise trigger")
            .parser_free()
    }

    pub fn from_config(descriptor: RuleDescriptor, config: Option<&ConfigValue>) -> Result<Self, DecodeError> {
        configured_severity(config, &descriptor.identifier, Severity::Warning)?;
        Ok(Self { descriptor })
    }
}

impl Rule for SuperfluousDisableCommand {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn validate(&self, _file: &SourceFile, _storage: &RuleStorage) -> Vec<Violation> {
        Vec::new()
    }
}
