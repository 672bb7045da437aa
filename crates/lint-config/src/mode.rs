//! Rule activation modes and their validation
//!
//! A document activates rules in exactly one of three ways: everything on,
//! an explicit allow-list, or the default set adjusted by `disabled_rules`
//! and `opt_in_rules`. [`RulesMode::make`] turns the raw lists from a
//! document into a validated mode whose identifiers are all canonical.

use std::collections::{BTreeMap, BTreeSet};

use lint_rules::{ALL_RULES, CUSTOM_RULES, RuleCatalog, RuleDescriptor};
use serde::Serialize;

use crate::{Error, Result, WarningSession};

/// How a policy decides which rules run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rules", rename_all = "snake_case")]
pub enum RulesMode {
    /// Every catalog rule, opt-in included
    AllEnabled,
    /// Exactly these rules
    Only(BTreeSet<String>),
    /// Non-opt-in rules minus `disabled`, plus the opt-in rules in `opt_in`
    Default {
        disabled: BTreeSet<String>,
        opt_in: BTreeSet<String>,
    },
}

impl Default for RulesMode {
    fn default() -> Self {
        Self::Default {
            disabled: BTreeSet::new(),
            opt_in: BTreeSet::new(),
        }
    }
}

/// Raw identifier lists as they appear in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleLists {
    pub enable_all_rules: bool,
    pub only_rules: Vec<String>,
    pub opt_in_rules: Vec<String>,
    pub disabled_rules: Vec<String>,
    pub analyzer_rules: Vec<String>,
}

/// Identifiers that validate even though the catalog does not list them.
///
/// `custom_rules` is `None` while a single document of a hierarchy is parsed:
/// its lists may name custom rules declared by a parent or child, so
/// identifiers outside the catalog are kept until
/// [`RulesMode::retain_known`] runs on the folded policy.
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    pub catalog: &'a RuleCatalog,
    pub custom_rules: Option<&'a BTreeSet<String>>,
}

impl Namespace<'_> {
    fn is_valid(&self, identifier: &str) -> bool {
        self.catalog.contains(identifier) || self.custom_rules.is_none_or(|custom| custom.contains(identifier))
    }

    fn valid_identifiers(&self) -> Vec<String> {
        let mut all: Vec<String> = self
            .catalog
            .all_valid_identifiers()
            .into_iter()
            .chain(self.custom_rules.into_iter().flatten().cloned())
            .collect();
        all.sort();
        all
    }
}

impl RulesMode {
    /// Build a validated mode from raw lists.
    ///
    /// Deprecated aliases are canonicalized (warning once per alias),
    /// duplicates are fatal, unknown identifiers are dropped with a warning.
    pub fn make(lists: &RuleLists, namespace: Namespace<'_>, session: &WarningSession) -> Result<Self> {
        let catalog = namespace.catalog;
        let resolve = |ids: &[String]| -> Vec<String> {
            ids.iter()
                .map(|id| resolve_alias(catalog, id, session))
                .collect()
        };

        if lists.enable_all_rules {
            return Ok(Self::AllEnabled);
        }

        let analyzer = validate(
            &resolve(&lists.analyzer_rules),
            "analyzer_rules",
            namespace,
            session,
        )?;

        if !lists.only_rules.is_empty() {
            if !lists.disabled_rules.is_empty() || !lists.opt_in_rules.is_empty() {
                return Err(Error::OnlyRulesConflict);
            }
            let only = validate(&resolve(&lists.only_rules), "only_rules", namespace, session)?;
            warn_misplaced_analyzer_rules(&only, "only_rules", catalog, session);
            return Ok(Self::Only(only.into_iter().chain(analyzer).collect()));
        }

        let disabled = validate(
            &resolve(&lists.disabled_rules),
            "disabled_rules",
            namespace,
            session,
        )?;

        let opt_in_raw = resolve(&lists.opt_in_rules);
        let opt_in = if opt_in_raw.iter().any(|id| id == ALL_RULES) {
            catalog
                .descriptors()
                .filter(|d| d.is_opt_in() && !d.is_analyzer_only())
                .map(|d| d.identifier.clone())
                .collect()
        } else {
            let opt_in = validate(&opt_in_raw, "opt_in_rules", namespace, session)?;
            warn_misplaced_analyzer_rules(&opt_in, "opt_in_rules", catalog, session);
            opt_in
        };

        Ok(Self::Default {
            disabled,
            opt_in: opt_in.into_iter().chain(analyzer).collect(),
        })
    }

    /// Drop identifiers that name neither a catalog rule nor a custom rule
    /// of `namespace`, warning once per identifier.
    pub fn retain_known(&self, namespace: Namespace<'_>, session: &WarningSession) -> Self {
        let retain = |ids: &BTreeSet<String>| retain_valid(ids.iter(), namespace, session);
        match self {
            Self::AllEnabled => Self::AllEnabled,
            Self::Only(only) => Self::Only(retain(only)),
            Self::Default { disabled, opt_in } => Self::Default {
                disabled: retain(disabled),
                opt_in: retain(opt_in),
            },
        }
    }

    /// Whether a catalog rule is active under this mode.
    pub fn activates(&self, descriptor: &RuleDescriptor) -> bool {
        match self {
            Self::AllEnabled => true,
            Self::Only(only) => only.contains(&descriptor.identifier),
            Self::Default { disabled, opt_in } => {
                !disabled.contains(&descriptor.identifier)
                    && (!descriptor.is_opt_in() || opt_in.contains(&descriptor.identifier))
            }
        }
    }

    /// Whether a custom regex rule is active under this mode.
    ///
    /// Custom rules are never opt-in. Listing `custom_rules` itself in
    /// `only_rules` activates every declared custom rule.
    pub fn activates_custom(&self, identifier: &str) -> bool {
        match self {
            Self::AllEnabled => true,
            Self::Only(only) => only.contains(identifier) || only.contains(CUSTOM_RULES),
            Self::Default { disabled, .. } => {
                !disabled.contains(identifier) && !disabled.contains(CUSTOM_RULES)
            }
        }
    }

    /// Catalog identifiers this mode activates.
    pub fn resulting_identifiers(&self, catalog: &RuleCatalog) -> BTreeSet<String> {
        catalog
            .descriptors()
            .filter(|d| self.activates(d))
            .map(|d| d.identifier.clone())
            .collect()
    }
}

/// Canonicalize one identifier, warning once if it was a deprecated alias.
pub fn resolve_alias(catalog: &RuleCatalog, identifier: &str, session: &WarningSession) -> String {
    let canonical = catalog.resolve(identifier);
    if canonical != identifier {
        session.warn_once(
            format!("deprecated-alias:{identifier}"),
            format!(
                "'{identifier}' has been renamed to '{canonical}' and will be completely removed in a future release."
            ),
        );
    }
    canonical.to_string()
}

fn validate(
    ids: &[String],
    list: &str,
    namespace: Namespace<'_>,
    session: &WarningSession,
) -> Result<BTreeSet<String>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id.as_str()).or_default() += 1;
    }
    if let Some((identifier, _)) = counts.iter().find(|(_, n)| **n > 1) {
        return Err(Error::DuplicateIdentifier {
            identifier: identifier.to_string(),
            list: list.to_string(),
        });
    }

    Ok(retain_valid(ids.iter(), namespace, session))
}

fn retain_valid<'a>(
    ids: impl Iterator<Item = &'a String>,
    namespace: Namespace<'_>,
    session: &WarningSession,
) -> BTreeSet<String> {
    let mut valid = BTreeSet::new();
    for id in ids {
        if namespace.is_valid(id) {
            valid.insert(id.clone());
        } else {
            session.warn_once(
                format!("invalid-identifier:{id}"),
                format!(
                    "'{id}' is not a valid rule identifier. Valid identifiers: {}",
                    namespace.valid_identifiers().join(", ")
                ),
            );
        }
    }
    valid
}

fn warn_misplaced_analyzer_rules(
    ids: &BTreeSet<String>,
    list: &str,
    catalog: &RuleCatalog,
    session: &WarningSession,
) {
    for id in ids {
        if catalog.descriptor(id).is_some_and(|d| d.is_analyzer_only()) {
            session.warn_once(
                format!("analyzer-in-{list}:{id}"),
                format!(
                    "'{id}' should be listed in the 'analyzer_rules' configuration section instead of '{list}'."
                ),
            );
        }
    }
}
