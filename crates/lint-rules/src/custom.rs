//! Regex rules declared in configuration under `custom_rules`

use regex::Regex;

use crate::{ConfigValue, DecodeError, Severity};

/// One user-declared regex rule.
///
/// Custom rules live in their own identifier namespace; the catalog only
/// knows the single `custom_rules` rule that runs them.
#[derive(Debug, Clone)]
pub struct CustomRuleConfig {
    pub identifier: String,
    pub name: Option<String>,
    pub message: Option<String>,
    pub regex: Regex,
    pub severity: Severity,
    pub included: Vec<Regex>,
    pub excluded: Vec<Regex>,
    /// The declaration as written, for fingerprinting and merging.
    pub raw: ConfigValue,
}

impl PartialEq for CustomRuleConfig {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.raw == other.raw
    }
}

impl CustomRuleConfig {
    /// Decode one `<identifier>: { regex: ..., ... }` entry.
    pub fn from_config(identifier: &str, value: &ConfigValue) -> Result<Self, DecodeError> {
        let path = format!("custom_rules.{identifier}");
        if value.as_map().is_none() {
            return Err(DecodeError::mismatch(&path, "a map", value));
        }

        let pattern: String = value
            .required("regex")
            .map_err(|e| nest(&path, e))?;
        let regex = compile(&format!("{path}.regex"), &pattern)?;

        let patterns = |key: &str| -> Result<Vec<Regex>, DecodeError> {
            value
                .string_list_field(key)
                .map_err(|e| nest(&path, e))?
                .iter()
                .map(|p| compile(&format!("{path}.{key}"), p))
                .collect()
        };

        Ok(Self {
            identifier: identifier.to_string(),
            name: value.field("name").map_err(|e| nest(&path, e))?,
            message: value.field("message").map_err(|e| nest(&path, e))?,
            regex,
            severity: value
                .field("severity")
                .map_err(|e| nest(&path, e))?
                .unwrap_or(Severity::Warning),
            included: patterns("included")?,
            excluded: patterns("excluded")?,
            raw: value.clone(),
        })
    }

    /// Decode the whole `custom_rules` map, sorted by identifier.
    pub fn all_from_config(value: &ConfigValue) -> Result<Vec<Self>, DecodeError> {
        let map = value
            .as_map()
            .ok_or_else(|| DecodeError::mismatch("custom_rules", "a map", value))?;
        map.iter()
            .map(|(identifier, entry)| Self::from_config(identifier, entry))
            .collect()
    }

    /// Whether this rule applies to a file at `path`.
    pub fn applies_to(&self, path: Option<&str>) -> bool {
        let Some(path) = path else {
            return self.included.is_empty();
        };
        let included = self.included.is_empty() || self.included.iter().any(|r| r.is_match(path));
        included && !self.excluded.iter().any(|r| r.is_match(path))
    }

    pub fn reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| format!("Regex matched: {}", self.regex.as_str()))
    }
}

fn compile(path: &str, pattern: &str) -> Result<Regex, DecodeError> {
    Regex::new(pattern).map_err(|e| DecodeError::invalid(path, e.to_string()))
}

fn nest(prefix: &str, err: DecodeError) -> DecodeError {
    match err {
        DecodeError::TypeMismatch {
            path,
            expected,
            found,
        } => DecodeError::TypeMismatch {
            path: format!("{prefix}.{path}"),
            expected,
            found,
        },
        DecodeError::Missing { path } => DecodeError::Missing {
            path: format!("{prefix}.{path}"),
        },
        DecodeError::InvalidValue { path, message } => DecodeError::InvalidValue {
            path: format!("{prefix}.{path}"),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_declaration() {
        let value = ConfigValue::from_yaml_str(
            "no_print:\n  regex: 'println!'\n  message: Use tracing\n  severity: error\n  excluded: ['tests/']\n",
        )
        .unwrap();
        let rules = CustomRuleConfig::all_from_config(&value).unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.identifier, "no_print");
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.reason(), "Use tracing");
        assert!(rule.applies_to(Some("src/main.rs")));
        assert!(!rule.applies_to(Some("tests/it.rs")));
    }

    #[test]
    fn missing_regex_is_reported_with_path() {
        let value = ConfigValue::from_yaml_str("bad:\n  message: x\n").unwrap();
        let err = CustomRuleConfig::all_from_config(&value).unwrap_err();
        assert_eq!(err.to_string(), "'custom_rules.bad.regex' is required");
    }

    #[test]
    fn invalid_regex_is_reported() {
        let value = ConfigValue::from_yaml_str("bad:\n  regex: '('\n").unwrap();
        assert!(matches!(
            CustomRuleConfig::all_from_config(&value),
            Err(DecodeError::InvalidValue { .. })
        ));
    }
}
