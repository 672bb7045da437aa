//! Built-in rules
//!
//! A small set of line-oriented rules plus the two meta rules every catalog
//! carries: `custom_rules`, which runs the regex rules declared in
//! configuration, and `superfluous_disable_command`, whose violations the
//! [`Linter`](crate::Linter) synthesizes from suppression regions.

mod custom;
mod file_length;
mod line_length;
mod meta;
mod todo;
mod trailing_whitespace;

pub use custom::CustomRules;
pub use file_length::FileLength;
pub use line_length::LineLength;
pub use meta::SuperfluousDisableCommand;
pub use todo::Todo;
pub use trailing_whitespace::TrailingWhitespace;

use lint_rules::{ConfigValue, DecodeError, Rule, RuleCatalog, RuleDescriptor, Severity};

/// Thresholds a measured quantity is compared against.
///
/// Accepts `120`, `[120, 200]` or `{ warning: 120, error: 200 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityLevels {
    pub warning: usize,
    pub error: Option<usize>,
}

impl SeverityLevels {
    pub const fn new(warning: usize, error: Option<usize>) -> Self {
        Self { warning, error }
    }

    pub fn from_config(config: Option<&ConfigValue>, path: &str, default: Self) -> Result<Self, DecodeError> {
        let Some(value) = config else {
            return Ok(default);
        };
        match value {
            ConfigValue::Int(_) => Ok(Self::new(value.decode(path)?, None)),
            ConfigValue::List(items) => match items.as_slice() {
                [warning] => Ok(Self::new(warning.decode(path)?, None)),
                [warning, error] => Ok(Self::new(warning.decode(path)?, Some(error.decode(path)?))),
                _ => Err(DecodeError::invalid(path, "expected one or two thresholds")),
            },
            ConfigValue::Map(_) => Ok(Self::new(
                value.field("warning")?.unwrap_or(default.warning),
                value.field("error")?.or(default.error),
            )),
            other => Err(DecodeError::mismatch(path, "a threshold", other)),
        }
    }

    /// Severity of `measured`, if it exceeds a threshold.
    pub fn severity_for(&self, measured: usize) -> Option<(Severity, usize)> {
        match self.error {
            Some(error) if measured > error => Some((Severity::Error, error)),
            _ if measured > self.warning => Some((Severity::Warning, self.warning)),
            _ => None,
        }
    }
}

/// Severity from a rule configuration that is either `warning`/`error` or
/// a map with a `severity` key.
pub fn configured_severity(config: Option<&ConfigValue>, path: &str, default: Severity) -> Result<Severity, DecodeError> {
    match config {
        Some(value @ ConfigValue::String(_)) => value.decode(path),
        Some(value @ ConfigValue::Map(_)) => Ok(value.field("severity")?.unwrap_or(default)),
        Some(ConfigValue::Null) | None => Ok(default),
        Some(other) => Err(DecodeError::mismatch(path, "a severity or a map", other)),
    }
}

fn register<R, F>(catalog: &mut RuleCatalog, descriptor: RuleDescriptor, build: F) -> lint_rules::Result<()>
where
    R: Rule + 'static,
    F: Fn(RuleDescriptor, Option<&ConfigValue>) -> Result<R, DecodeError> + Send + Sync + 'static,
{
    let rule_descriptor = descriptor.clone();
    catalog.register(descriptor, move |config| {
        Ok(Box::new(build(rule_descriptor.clone(), config)?) as Box<dyn Rule>)
    })
}

/// Catalog holding every built-in rule.
pub fn builtin_catalog() -> lint_rules::Result<RuleCatalog> {
    let mut catalog = RuleCatalog::new();
    register(&mut catalog, TrailingWhitespace::descriptor(), TrailingWhitespace::from_config)?;
    register(&mut catalog, LineLength::descriptor(), LineLength::from_config)?;
    register(&mut catalog, Todo::descriptor(), Todo::from_config)?;
    register(&mut catalog, FileLength::descriptor(), FileLength::from_config)?;
    register(&mut catalog, CustomRules::descriptor(), CustomRules::from_config)?;
    register(
        &mut catalog,
        SuperfluousDisableCommand::descriptor(),
        SuperfluousDisableCommand::from_config,
    )?;
    Ok(catalog)
}
