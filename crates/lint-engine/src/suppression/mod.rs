//! Inline suppression of rules
//!
//! Suppression comments are parsed into [`Command`]s, which are turned into
//! position-indexed [`Region`]s. A violation is dropped when the region it
//! falls into disables its rule. The same regions are used to find
//! suppressions that suppress nothing and suppressions naming rules that do
//! not exist.

mod command;
mod region;

pub use command::{Action, COMMAND_PREFIX, Command, Modifier, expanded_commands, parse_commands};
pub use region::{Region, regions};

use std::collections::BTreeSet;

use lint_rules::{ALL_RULES, RuleDescriptor, Severity, SourceFile, Violation};

/// The rule that reports suppression hygiene problems.
#[derive(Debug, Clone)]
pub struct MetaRule {
    pub descriptor: RuleDescriptor,
    pub severity: Severity,
}

impl MetaRule {
    fn violation(&self, region: &Region, reason: String) -> Violation {
        Violation::new(
            &self.descriptor.identifier,
            self.severity,
            region.start.clone(),
            reason,
        )
    }
}

/// Suppression state of one file.
#[derive(Debug, Clone)]
pub struct Suppressions {
    file: Option<String>,
    commands: Vec<Command>,
    regions: Vec<Region>,
}

impl Suppressions {
    pub fn new(file: &SourceFile) -> Self {
        Self::from_commands(expanded_commands(file), file.display_path())
    }

    /// Build from already expanded, position-ordered commands.
    pub fn from_commands(commands: Vec<Command>, file: Option<String>) -> Self {
        let regions = regions(&commands, file.clone());
        Self {
            file,
            commands,
            regions,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The region a location falls into, if any command precedes it.
    pub fn region_for(&self, violation: &Violation) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(&violation.location))
    }

    /// Regions built only from commands that mention one of `identifiers`.
    pub fn restricted_regions(&self, identifiers: &BTreeSet<&str>) -> Vec<Region> {
        let commands: Vec<Command> = self
            .commands
            .iter()
            .filter(|c| c.identifiers.iter().any(|id| identifiers.contains(id.as_str())))
            .cloned()
            .collect();
        regions(&commands, self.file.clone())
    }

    /// Whether `violation`, reported by the rule `descriptor`, is suppressed.
    ///
    /// Violations a rule reports under a sub-identifier can be suppressed by
    /// that identifier or by the reporting rule's own.
    pub fn suppresses(&self, violation: &Violation, descriptor: &RuleDescriptor) -> bool {
        let Some(region) = self.region_for(violation) else {
            return false;
        };
        region.disables(descriptor) || region.disabled.contains(&violation.rule_id)
    }

    /// Disable regions for `identifiers` that contain none of `violations`.
    ///
    /// `identifiers` are every name of one rule; `label` is the name the
    /// violation message uses.
    pub fn superfluous_violations(
        &self,
        identifiers: &BTreeSet<&str>,
        label: &str,
        violations: &[Violation],
        meta: &MetaRule,
    ) -> Vec<Violation> {
        if self.regions.is_empty() {
            return Vec::new();
        }

        let regions = if self.regions.len() > 1 {
            let mut relevant = identifiers.clone();
            relevant.extend(meta.descriptor.all_identifiers());
            relevant.insert(ALL_RULES);
            self.restricted_regions(&relevant)
        } else {
            self.regions.clone()
        };

        let meta_disabled: Vec<&Region> = regions
            .iter()
            .filter(|r| r.disables(&meta.descriptor))
            .collect();

        regions
            .iter()
            .filter(|region| region.explicitly_disables(identifiers.iter().copied()))
            .filter(|region| !meta_disabled.iter().any(|m| m.contains(&region.start)))
            .filter(|region| !violations.iter().any(|v| region.contains(&v.location)))
            .map(|region| {
                meta.violation(
                    region,
                    format!("Rule '{label}' did not trigger a violation in the disabled region; remove the disable command"),
                )
            })
            .collect()
    }

    /// Violations for disabled identifiers that name no known rule.
    ///
    /// Each unknown identifier is reported once per stretch of regions that
    /// keep it disabled, at the start of the first.
    pub fn unknown_identifier_violations(&self, valid: &BTreeSet<String>, meta: &MetaRule) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut previous: BTreeSet<String> = BTreeSet::new();
        for region in &self.regions {
            for id in &region.disabled {
                if id == ALL_RULES || valid.contains(id) || previous.contains(id) {
                    continue;
                }
                violations.push(meta.violation(
                    region,
                    format!("'{id}' is not a valid rule; remove it from the disable command"),
                ));
            }
            previous = region.disabled.clone();
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_rules::{Location, SUPERFLUOUS_DISABLE_COMMAND};
    use pretty_assertions::assert_eq;

    fn meta() -> MetaRule {
        MetaRule {
            descriptor: RuleDescriptor::new(SUPERFLUOUS_DISABLE_COMMAND, "Superfluous Disable Command"),
            severity: Severity::Warning,
        }
    }

    fn foo_violation(line: usize) -> Violation {
        Violation::new("foo", Severity::Warning, Location::new(None, line, Some(1)), "bad")
    }

    fn ids<'a>(list: &[&'a str]) -> BTreeSet<&'a str> {
        list.iter().copied().collect()
    }

    #[test]
    fn file_wide_disable_without_violations_is_superfluous() {
        let suppressions = Suppressions::new(&SourceFile::from_contents("// lint:disable foo\na\nb\n"));
        let found = suppressions.superfluous_violations(&ids(&["foo"]), "foo", &[], &meta());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, Location::new(None, 1, Some(20)));
        assert!(found[0].reason.contains("'foo'"));
    }

    #[test]
    fn disable_with_real_violation_is_not_superfluous() {
        let suppressions = Suppressions::new(&SourceFile::from_contents("// lint:disable foo\na\nb\n"));
        let found = suppressions.superfluous_violations(&ids(&["foo"]), "foo", &[foo_violation(2)], &meta());
        assert!(found.is_empty());
    }

    #[test]
    fn disabling_the_meta_rule_silences_it() {
        let suppressions = Suppressions::new(&SourceFile::from_contents(
            "// lint:disable foo superfluous_disable_command\na\n",
        ));
        let found = suppressions.superfluous_violations(&ids(&["foo"]), "foo", &[], &meta());
        assert!(found.is_empty());
    }

    #[test]
    fn other_rules_commands_do_not_split_regions() {
        let source = "// lint:disable foo\na\n// lint:disable:next bar\nVIOLATION\nb\n";
        let suppressions = Suppressions::new(&SourceFile::from_contents(source));
        let found = suppressions.superfluous_violations(&ids(&["foo"]), "foo", &[foo_violation(5)], &meta());
        assert!(found.is_empty());
    }

    #[test]
    fn unknown_identifiers_are_reported_once() {
        let source = "// lint:disable nope\na\n// lint:disable:next foo\nb\n";
        let suppressions = Suppressions::new(&SourceFile::from_contents(source));
        let valid: BTreeSet<String> = ["foo".to_string()].into();
        let found = suppressions.unknown_identifier_violations(&valid, &meta());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reason, "'nope' is not a valid rule; remove it from the disable command");
    }

    #[test]
    fn sub_identifier_suppresses() {
        let suppressions = Suppressions::new(&SourceFile::from_contents("// lint:disable:next no_print\nprint()\n"));
        let violation = Violation::new("no_print", Severity::Warning, Location::new(None, 2, Some(1)), "x");
        assert!(suppressions.suppresses(&violation, &RuleDescriptor::new("custom_rules", "Custom Rules")));
    }
}
