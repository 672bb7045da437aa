//! Disabled-rule regions computed from suppression commands

use std::collections::BTreeSet;

use lint_rules::{ALL_RULES, Location, RuleDescriptor};

use super::command::{Action, Command};

/// A span of a file and the identifiers disabled across it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: Location,
    pub end: Location,
    pub disabled: BTreeSet<String>,
}

fn position(location: &Location) -> (usize, Option<usize>) {
    (location.line, location.character)
}

impl Region {
    pub fn contains(&self, location: &Location) -> bool {
        let at = position(location);
        position(&self.start) <= at && at <= position(&self.end)
    }

    /// Whether any of `identifiers` (or `all`) is disabled here.
    pub fn disables_any<'a>(&self, mut identifiers: impl Iterator<Item = &'a str>) -> bool {
        self.disabled.contains(ALL_RULES) || identifiers.any(|id| self.disabled.contains(id))
    }

    pub fn disables(&self, descriptor: &RuleDescriptor) -> bool {
        self.disables_any(descriptor.all_identifiers())
    }

    /// Whether the rule is disabled by name rather than through `all`.
    pub fn explicitly_disables<'a>(&self, mut identifiers: impl Iterator<Item = &'a str>) -> bool {
        identifiers.any(|id| self.disabled.contains(id))
    }

    /// Deprecated aliases of `descriptor` used to disable it here.
    pub fn deprecated_aliases_disabling(&self, descriptor: &RuleDescriptor) -> Vec<String> {
        descriptor
            .deprecated_aliases
            .iter()
            .filter(|alias| self.disabled.contains(*alias))
            .cloned()
            .collect()
    }
}

/// Where the region opened by the current command ends: just before `next`.
fn end_of(next: Option<&Command>, file: &Option<String>) -> Location {
    let Some(next) = next else {
        return Location::new(file.clone(), usize::MAX, Some(usize::MAX));
    };
    match next.character {
        Some(character) => Location::new(
            file.clone(),
            next.line,
            if character > 0 { Some(character - 1) } else { None },
        ),
        None => Location::new(file.clone(), next.line.saturating_sub(1), Some(usize::MAX)),
    }
}

/// Build regions from position-ordered, expanded commands.
///
/// Each command opens a region that lasts until the next command; regions
/// sharing the same span are merged.
pub fn regions(commands: &[Command], file: Option<String>) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    let mut disabled: BTreeSet<String> = BTreeSet::new();

    for (idx, command) in commands.iter().enumerate() {
        match command.action {
            Action::Disable => disabled.extend(command.identifiers.iter().cloned()),
            Action::Enable => disabled.retain(|id| !command.identifiers.contains(id)),
        }

        let start = Location::new(file.clone(), command.line, command.character);
        let end = end_of(commands.get(idx + 1), &file);
        if position(&start) >= position(&end) {
            continue;
        }

        match regions
            .iter_mut()
            .find(|r| position(&r.start) == position(&start) && position(&r.end) == position(&end))
        {
            Some(existing) => existing.disabled.extend(disabled.iter().cloned()),
            None => regions.push(Region {
                start,
                end,
                disabled: disabled.clone(),
            }),
        }
    }
    regions
}
