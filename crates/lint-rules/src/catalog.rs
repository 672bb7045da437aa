//! Rule catalog: the registry of known rules and their aliases
//!
//! The catalog is built once at startup and never mutated afterwards. It owns
//! the alias table, so every identifier that enters the configuration layer
//! is canonicalized here.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{ConfigValue, DecodeError, Error, Result, Rule, RuleDescriptor};

/// Builds a configured rule instance from its (optional) configuration payload.
pub type RuleFactory =
    Arc<dyn Fn(Option<&ConfigValue>) -> std::result::Result<Box<dyn Rule>, DecodeError> + Send + Sync>;

/// One registered rule.
#[derive(Clone)]
pub struct CatalogEntry {
    pub descriptor: RuleDescriptor,
    factory: RuleFactory,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registry of rules keyed by canonical identifier.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    entries: BTreeMap<String, CatalogEntry>,
    /// Deprecated alias -> canonical identifier
    aliases: BTreeMap<String, String>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    ///
    /// Fails if the identifier is taken or an alias would map to two rules.
    pub fn register<F>(&mut self, descriptor: RuleDescriptor, factory: F) -> Result<()>
    where
        F: Fn(Option<&ConfigValue>) -> std::result::Result<Box<dyn Rule>, DecodeError>
            + Send
            + Sync
            + 'static,
    {
        let identifier = descriptor.identifier.clone();
        if self.entries.contains_key(&identifier) || self.aliases.contains_key(&identifier) {
            return Err(Error::DuplicateRule { identifier });
        }
        for alias in &descriptor.deprecated_aliases {
            if let Some(existing) = self.aliases.get(alias) {
                return Err(Error::AliasConflict {
                    alias: alias.clone(),
                    existing: existing.clone(),
                    requested: identifier,
                });
            }
            if self.entries.contains_key(alias) {
                return Err(Error::AliasConflict {
                    alias: alias.clone(),
                    existing: alias.clone(),
                    requested: identifier,
                });
            }
        }

        for alias in &descriptor.deprecated_aliases {
            self.aliases.insert(alias.clone(), identifier.clone());
        }
        tracing::debug!(rule = %identifier, "Registered rule");
        self.entries.insert(
            identifier,
            CatalogEntry {
                descriptor,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, descriptor: RuleDescriptor, factory: F) -> Result<Self>
    where
        F: Fn(Option<&ConfigValue>) -> std::result::Result<Box<dyn Rule>, DecodeError>
            + Send
            + Sync
            + 'static,
    {
        self.register(descriptor, factory)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up by canonical identifier or alias.
    pub fn get(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.entries.get(self.resolve(identifier))
    }

    pub fn descriptor(&self, identifier: &str) -> Option<&RuleDescriptor> {
        self.get(identifier).map(|entry| &entry.descriptor)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Map an alias to its canonical identifier.
    ///
    /// Identifiers that are not aliases come back unchanged, which makes the
    /// mapping idempotent.
    pub fn resolve<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.aliases
            .get(identifier)
            .map(String::as_str)
            .unwrap_or(identifier)
    }

    pub fn is_deprecated_alias(&self, identifier: &str) -> bool {
        self.aliases.contains_key(identifier)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.entries.values().map(|entry| &entry.descriptor)
    }

    /// Canonical identifiers, sorted.
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Canonical identifiers plus every deprecated alias.
    pub fn all_valid_identifiers(&self) -> BTreeSet<String> {
        self.entries
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect()
    }

    pub fn opt_in_identifiers(&self) -> BTreeSet<String> {
        self.descriptors()
            .filter(|d| d.is_opt_in())
            .map(|d| d.identifier.clone())
            .collect()
    }

    pub fn analyzer_identifiers(&self) -> BTreeSet<String> {
        self.descriptors()
            .filter(|d| d.is_analyzer_only())
            .map(|d| d.identifier.clone())
            .collect()
    }

    /// Build a configured instance of `identifier`.
    pub fn instantiate(
        &self,
        identifier: &str,
        config: Option<&ConfigValue>,
    ) -> Result<Box<dyn Rule>> {
        let entry = self.get(identifier).ok_or_else(|| Error::UnknownRule {
            identifier: identifier.to_string(),
        })?;
        (entry.factory)(config).map_err(|source| Error::InvalidRuleConfiguration {
            identifier: entry.descriptor.identifier.clone(),
            source,
        })
    }
}
