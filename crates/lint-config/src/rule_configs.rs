//! Per-rule configuration payloads found in a document

use std::collections::BTreeMap;

use lint_rules::{CUSTOM_RULES, ConfigValue, RuleCatalog};
use serde::Serialize;

use crate::keys::ConfigKey;
use crate::mode::resolve_alias;
use crate::{Error, Result, WarningSession};

/// A rule's configuration blob as written in one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleConfigEntry {
    pub value: ConfigValue,
    /// False for `~`, `{}` and `[]`, which carry no settings
    pub explicitly_configured: bool,
}

impl RuleConfigEntry {
    pub fn new(value: ConfigValue) -> Self {
        let explicitly_configured = match &value {
            ConfigValue::Null => false,
            ConfigValue::Map(map) => !map.is_empty(),
            ConfigValue::List(items) => !items.is_empty(),
            _ => true,
        };
        Self {
            value,
            explicitly_configured,
        }
    }
}

/// Rule configurations keyed by canonical identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleConfigs {
    entries: BTreeMap<String, RuleConfigEntry>,
}

impl RuleConfigs {
    /// Collect every top-level key that names a catalog rule.
    ///
    /// Keys that are neither rule identifiers, top-level keys nor
    /// `custom_rules` are reported once as invalid. Configuring one rule
    /// under two of its names is fatal.
    pub fn from_document(
        document: &ConfigValue,
        origin: &str,
        catalog: &RuleCatalog,
        session: &WarningSession,
    ) -> Result<Self> {
        let Some(map) = document.as_map() else {
            return Ok(Self::default());
        };

        let mut entries = BTreeMap::new();
        let mut written_as: BTreeMap<String, String> = BTreeMap::new();
        let mut invalid = Vec::new();

        for (key, value) in map {
            if ConfigKey::parse(key).is_some() || key == CUSTOM_RULES {
                continue;
            }
            if !catalog.contains(key) {
                invalid.push(key.clone());
                continue;
            }

            let canonical = resolve_alias(catalog, key, session);
            if let Some(previous) = written_as.insert(canonical.clone(), key.clone()) {
                return Err(Error::DuplicateRuleConfiguration {
                    identifier: canonical,
                    aliases: format!("{previous}, {key}"),
                });
            }
            entries.insert(canonical, RuleConfigEntry::new(value.clone()));
        }

        if !invalid.is_empty() {
            session.warn_once(
                format!("invalid-keys:{origin}:{}", invalid.join(",")),
                format!(
                    "Configuration at {origin} contains invalid keys: [{}]",
                    invalid.join(", ")
                ),
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, identifier: &str) -> Option<&RuleConfigEntry> {
        self.entries.get(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleConfigEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, value: ConfigValue) {
        self.entries
            .insert(identifier.into(), RuleConfigEntry::new(value));
    }

    /// Union by identifier; the child's entry wins when it is explicitly
    /// configured, otherwise the parent's is kept.
    pub fn merged(&self, child: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (id, child_entry) in &child.entries {
            match entries.get(id) {
                Some(parent_entry)
                    if !child_entry.explicitly_configured && parent_entry.explicitly_configured => {}
                _ => {
                    entries.insert(id.clone(), child_entry.clone());
                }
            }
        }
        Self { entries }
    }
}
