//! Static rule metadata

use std::collections::BTreeSet;

use serde::Serialize;

/// Capability flags the orchestrator queries instead of inspecting rule types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Inactive unless explicitly opted in
    pub opt_in: bool,
    /// Can rewrite the file to fix its own violations
    pub correctable: bool,
    /// Needs compiler arguments; only runs in analyze mode
    pub analyzer_only: bool,
    /// Gathers cross-file information before validation
    pub collecting: bool,
    /// Does not need the parsed syntax tree
    pub parser_free: bool,
}

/// Identity and capabilities of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub deprecated_aliases: BTreeSet<String>,
    pub capabilities: Capabilities,
}

impl RuleDescriptor {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: String::new(),
            deprecated_aliases: BTreeSet::new(),
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.deprecated_aliases.insert(alias.into());
        self
    }

    pub fn opt_in(mut self) -> Self {
        self.capabilities.opt_in = true;
        self
    }

    pub fn correctable(mut self) -> Self {
        self.capabilities.correctable = true;
        self
    }

    /// Analyzer rules are always opt-in.
    pub fn analyzer_only(mut self) -> Self {
        self.capabilities.analyzer_only = true;
        self.capabilities.opt_in = true;
        self
    }

    pub fn collecting(mut self) -> Self {
        self.capabilities.collecting = true;
        self
    }

    pub fn parser_free(mut self) -> Self {
        self.capabilities.parser_free = true;
        self
    }

    /// The canonical identifier plus every deprecated alias.
    pub fn all_identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.identifier.as_str())
            .chain(self.deprecated_aliases.iter().map(String::as_str))
    }

    pub fn is_opt_in(&self) -> bool {
        self.capabilities.opt_in
    }

    pub fn is_analyzer_only(&self) -> bool {
        self.capabilities.analyzer_only
    }
}
