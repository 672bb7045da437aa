//! Violations reported by rules

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::value::{ConfigValue, DecodeError, FromConfigValue};

/// How serious a violation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromConfigValue for Severity {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        match String::from_config_value(value, path)?.to_lowercase().as_str() {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(DecodeError::invalid(
                path,
                format!("'{other}' is not a severity (expected 'warning' or 'error')"),
            )),
        }
    }
}

/// A position in a source file.
///
/// Lines are 1-based. `character` is optional: a location without one sorts
/// before every location with one on the same line, so `(3, None)` means
/// "the start of line 3".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<usize>,
}

impl Location {
    pub fn new(file: Option<String>, line: usize, character: Option<usize>) -> Self {
        Self {
            file,
            line,
            character,
        }
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.file, self.line, self.character).cmp(&(&other.file, other.line, other.character))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
        }
        write!(f, "{}", self.line)?;
        if let Some(character) = self.character {
            write!(f, ":{character}")?;
        }
        Ok(())
    }
}

/// One finding reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub severity: Severity,
    pub location: Location,
    pub reason: String,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        location: Location,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            location,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {} ({})",
            self.location, self.severity, self.reason, self.rule_id
        )
    }
}
