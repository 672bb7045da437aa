//! The boundary to rule analyzers

use serde_json::Value;

use crate::{RuleDescriptor, RuleStorage, SourceFile, Violation};

/// A configured rule instance.
///
/// Implementations decide how to inspect a file; the engine only cares
/// about the violations they return. Instances are shared across worker
/// threads, so they must be `Send + Sync`.
pub trait Rule: Send + Sync {
    fn descriptor(&self) -> &RuleDescriptor;

    fn validate(&self, file: &SourceFile, storage: &RuleStorage) -> Vec<Violation>;

    /// Gather cross-file information before validation.
    ///
    /// Only called for rules whose descriptor is `collecting`.
    fn collect(&self, _file: &SourceFile, _storage: &RuleStorage) -> Option<Value> {
        None
    }

    /// Corrected contents of `file`, or `None` when there is nothing to fix.
    ///
    /// Only called for rules whose descriptor is `correctable`.
    fn correct(&self, _file: &SourceFile) -> Option<String> {
        None
    }

    /// Identifiers of the sub-rules this rule reports under, when it reports
    /// under identifiers other than its own.
    fn reported_identifiers(&self) -> Vec<String> {
        Vec::new()
    }
}
