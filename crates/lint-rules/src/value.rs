//! Untyped configuration values with typed decoding
//!
//! A configuration document is parsed once into a [`ConfigValue`] tree.
//! Consumers never inspect the tree by hand; they decode the pieces they need
//! through [`FromConfigValue`], which reports the key path and the mismatched
//! type instead of silently ignoring bad input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The parsed form of one configuration document.
///
/// Maps use `BTreeMap` so serialization is deterministic; policy
/// fingerprints are computed from the serialized form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(BTreeMap<String, ConfigValue>),
}

/// Failure to decode a [`ConfigValue`] into a concrete type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("'{path}' should be {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{path}' is required")]
    Missing { path: String },

    #[error("'{path}' is invalid: {message}")]
    InvalidValue { path: String, message: String },
}

impl DecodeError {
    pub fn mismatch(path: &str, expected: &'static str, found: &ConfigValue) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected,
            found: found.kind(),
        }
    }

    pub fn invalid(path: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl ConfigValue {
    /// Parse YAML text into a value tree.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Self::from(raw))
    }

    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::Float(_) => "a number",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Decode the whole value.
    pub fn decode<T: FromConfigValue>(&self, path: &str) -> Result<T, DecodeError> {
        T::from_config_value(self, path)
    }

    /// Decode an optional map entry. Absent and `null` both yield `None`.
    pub fn field<T: FromConfigValue>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.get(key) {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(value) => T::from_config_value(value, key).map(Some),
        }
    }

    /// Decode a mandatory map entry.
    pub fn required<T: FromConfigValue>(&self, key: &str) -> Result<T, DecodeError> {
        self.field(key)?.ok_or_else(|| DecodeError::Missing {
            path: key.to_string(),
        })
    }

    /// A string or a list of strings, as accepted by every identifier list key.
    pub fn string_list(&self, path: &str) -> Result<Vec<String>, DecodeError> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::String(s) => Ok(vec![s.clone()]),
            Self::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| DecodeError::mismatch(&format!("{path}[{i}]"), "a string", item))
                })
                .collect(),
            other => Err(DecodeError::mismatch(path, "a string or a list of strings", other)),
        }
    }

    /// Optional map entry decoded with [`string_list`](Self::string_list).
    pub fn string_list_field(&self, key: &str) -> Result<Vec<String>, DecodeError> {
        match self.get(key) {
            Some(value) => value.string_list(key),
            None => Ok(Vec::new()),
        }
    }
}

impl From<serde_yaml::Value> for ConfigValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Y;
        match value {
            Y::Null => Self::Null,
            Y::Bool(b) => Self::Bool(b),
            Y::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Y::String(s) => Self::String(s),
            Y::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Y::Mapping(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            Y::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Y;
    match key {
        Y::String(s) => s,
        Y::Bool(b) => b.to_string(),
        Y::Number(n) => n.to_string(),
        Y::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Types that can be decoded from a [`ConfigValue`].
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError>;
}

impl FromConfigValue for ConfigValue {
    fn from_config_value(value: &ConfigValue, _path: &str) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        value
            .as_bool()
            .ok_or_else(|| DecodeError::mismatch(path, "a boolean", value))
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        value
            .as_int()
            .ok_or_else(|| DecodeError::mismatch(path, "an integer", value))
    }
}

impl FromConfigValue for usize {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        let int = i64::from_config_value(value, path)?;
        usize::try_from(int).map_err(|_| DecodeError::invalid(path, format!("{int} is negative")))
    }
}

impl FromConfigValue for f64 {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        value
            .as_float()
            .ok_or_else(|| DecodeError::mismatch(path, "a number", value))
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch(path, "a string", value))
    }
}

impl<T: FromConfigValue> FromConfigValue for Vec<T> {
    fn from_config_value(value: &ConfigValue, path: &str) -> Result<Self, DecodeError> {
        let items = value
            .as_list()
            .ok_or_else(|| DecodeError::mismatch(path, "a list", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_config_value(item, &format!("{path}[{i}]")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_document_converts() {
        let value = ConfigValue::from_yaml_str(
            "disabled_rules:\n  - a\n  - b\nwarning_threshold: 3\nratio: 0.5\n1: one\n",
        )
        .unwrap();

        assert_eq!(
            value.string_list_field("disabled_rules").unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(value.field::<i64>("warning_threshold").unwrap(), Some(3));
        assert_eq!(value.field::<f64>("ratio").unwrap(), Some(0.5));
        assert_eq!(value.get("1"), Some(&ConfigValue::from("one")));
    }

    #[test]
    fn single_string_is_a_list() {
        let value = ConfigValue::from_yaml_str("only_rules: a").unwrap();
        assert_eq!(value.string_list_field("only_rules").unwrap(), vec!["a"]);
    }

    #[test]
    fn mismatch_names_path_and_type() {
        let value = ConfigValue::from_yaml_str("strict: yes please").unwrap();
        let err = value.field::<bool>("strict").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'strict' should be a boolean, found a string"
        );
    }

    #[test]
    fn list_item_mismatch_is_indexed() {
        let value = ConfigValue::from_yaml_str("excluded: [a, 3]").unwrap();
        let err = value.string_list_field("excluded").unwrap_err();
        assert_eq!(err.to_string(), "'excluded[1]' should be a string, found an integer");
    }

    #[test]
    fn null_field_is_absent() {
        let value = ConfigValue::from_yaml_str("reporter: ~").unwrap();
        assert_eq!(value.field::<String>("reporter").unwrap(), None);
        assert!(matches!(
            value.required::<String>("reporter"),
            Err(DecodeError::Missing { .. })
        ));
    }
}
