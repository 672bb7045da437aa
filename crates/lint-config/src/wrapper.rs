//! Merge algebra for rule activation
//!
//! A [`RulesWrapper`] is the rule-related half of a policy: the activation
//! mode, per-rule configuration and declared custom rules. Merging a parent
//! with a child is deliberately asymmetric: the child dominates, but how
//! much of the parent survives depends on which mode the child uses.

use std::collections::BTreeSet;

use lint_rules::{CUSTOM_RULES, ConfigValue, CustomRuleConfig, Rule, RuleCatalog};

use crate::mode::{Namespace, RulesMode};
use crate::rule_configs::RuleConfigs;
use crate::{Result, WarningSession};

/// Activation mode, rule configurations and custom rules of one policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesWrapper {
    pub mode: RulesMode,
    pub rule_configs: RuleConfigs,
    pub custom_rules: Vec<CustomRuleConfig>,
    /// Every custom rule identifier declared along the hierarchy, including
    /// those the mode has since switched off
    pub declared_custom_rules: BTreeSet<String>,
}

impl RulesWrapper {
    pub fn new(mode: RulesMode, rule_configs: RuleConfigs, custom_rules: Vec<CustomRuleConfig>) -> Self {
        let declared_custom_rules = custom_rules.iter().map(|r| r.identifier.clone()).collect();
        Self {
            mode,
            rule_configs,
            custom_rules,
            declared_custom_rules,
        }
    }

    /// Combine `self` (the parent) with `child`.
    pub fn merged(&self, child: &Self, catalog: &RuleCatalog) -> Self {
        let mode = merge_mode(&self.mode, &child.mode, catalog);

        let mut custom_rules = child.custom_rules.clone();
        let child_ids: BTreeSet<&str> = child
            .custom_rules
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        custom_rules.extend(
            self.custom_rules
                .iter()
                .filter(|r| !child_ids.contains(r.identifier.as_str()))
                .cloned(),
        );
        custom_rules.retain(|r| mode.activates_custom(&r.identifier));
        custom_rules.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Self {
            mode,
            rule_configs: self.rule_configs.merged(&child.rule_configs),
            custom_rules,
            declared_custom_rules: self
                .declared_custom_rules
                .union(&child.declared_custom_rules)
                .cloned()
                .collect(),
        }
    }

    /// Drop mode identifiers that name neither a catalog rule nor a custom
    /// rule declared anywhere in the hierarchy.
    ///
    /// Runs once on the folded policy; single documents keep unknown
    /// identifiers since another document may declare them.
    pub fn retain_known_identifiers(&mut self, catalog: &RuleCatalog, session: &WarningSession) {
        self.mode = self.mode.retain_known(
            Namespace {
                catalog,
                custom_rules: Some(&self.declared_custom_rules),
            },
            session,
        );
    }

    /// Custom rules the mode keeps active.
    pub fn active_custom_rules(&self) -> impl Iterator<Item = &CustomRuleConfig> {
        self.custom_rules
            .iter()
            .filter(|r| self.mode.activates_custom(&r.identifier))
    }

    /// Catalog identifiers that will run.
    ///
    /// `custom_rules` runs whenever at least one custom rule is active and the
    /// mode does not switch it off explicitly.
    pub fn active_identifiers(&self, catalog: &RuleCatalog) -> BTreeSet<String> {
        let mut active = self.mode.resulting_identifiers(catalog);
        let custom_switched_off = match &self.mode {
            RulesMode::Default { disabled, .. } => disabled.contains(CUSTOM_RULES),
            _ => false,
        };
        if catalog.contains(CUSTOM_RULES) {
            if self.active_custom_rules().next().is_some() && !custom_switched_off {
                active.insert(CUSTOM_RULES.to_string());
            } else {
                active.remove(CUSTOM_RULES);
            }
        }
        active
    }

    /// Configuration payload a rule is instantiated with.
    ///
    /// `custom_rules` receives the declarations of the active custom rules.
    pub fn config_for(&self, identifier: &str) -> Option<ConfigValue> {
        if identifier == CUSTOM_RULES {
            let map = self
                .active_custom_rules()
                .map(|r| (r.identifier.clone(), r.raw.clone()))
                .collect();
            return Some(ConfigValue::Map(map));
        }
        self.rule_configs.get(identifier).map(|e| e.value.clone())
    }

    /// Instantiate every active rule with its merged configuration.
    pub fn instantiate(&self, catalog: &RuleCatalog) -> Result<Vec<Box<dyn Rule>>> {
        self.active_identifiers(catalog)
            .iter()
            .map(|id| {
                let config = self.config_for(id);
                catalog.instantiate(id, config.as_ref()).map_err(Into::into)
            })
            .collect()
    }

    /// Warn about rules that carry configuration but will not run.
    pub fn warn_about_inactive_configurations(&self, catalog: &RuleCatalog, session: &WarningSession) {
        let active = self.active_identifiers(catalog);
        for (id, entry) in self.rule_configs.iter() {
            if !entry.explicitly_configured || active.contains(id) {
                continue;
            }
            let reason = match &self.mode {
                RulesMode::AllEnabled => continue,
                RulesMode::Only(_) => "it is not listed in 'only_rules'".to_string(),
                RulesMode::Default { disabled, .. } if disabled.contains(id) => {
                    "it is disabled in 'disabled_rules'".to_string()
                }
                RulesMode::Default { .. } => "it is not enabled in 'opt_in_rules'".to_string(),
            };
            session.warn_once(
                format!("inactive-configuration:{id}"),
                format!("Found a configuration for '{id}' rule, but {reason}."),
            );
        }
    }
}

/// Merge a parent's mode with a child's, dispatched on the child.
pub fn merge_mode(parent: &RulesMode, child: &RulesMode, catalog: &RuleCatalog) -> RulesMode {
    match child {
        RulesMode::AllEnabled => RulesMode::AllEnabled,
        RulesMode::Only(only) => RulesMode::Only(only.clone()),
        RulesMode::Default {
            disabled: child_disabled,
            opt_in: child_opt_in,
        } => match parent {
            RulesMode::Default {
                disabled: parent_disabled,
                opt_in: parent_opt_in,
            } => {
                let opt_in_ids = catalog.opt_in_identifiers();
                let disabled = child_disabled
                    .iter()
                    .chain(parent_disabled.difference(child_opt_in))
                    .cloned()
                    .collect();
                let opt_in = child_opt_in
                    .iter()
                    .chain(parent_opt_in.difference(child_disabled))
                    .filter(|id| opt_in_ids.contains(*id))
                    .cloned()
                    .collect();
                RulesMode::Default { disabled, opt_in }
            }
            RulesMode::Only(parent_only) => RulesMode::Only(
                child_opt_in
                    .union(parent_only)
                    .filter(|id| !child_disabled.contains(*id))
                    .cloned()
                    .collect(),
            ),
            RulesMode::AllEnabled => {
                let opt_in_ids = catalog.opt_in_identifiers();
                RulesMode::Default {
                    disabled: child_disabled.difference(&opt_in_ids).cloned().collect(),
                    opt_in: catalog
                        .identifiers()
                        .into_iter()
                        .filter(|id| !child_disabled.contains(id) && opt_in_ids.contains(id))
                        .collect(),
                }
            }
        },
    }
}
