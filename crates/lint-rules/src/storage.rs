//! Cross-file information gathered by collecting rules

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

/// Per-rule, per-file collected data.
///
/// The collect pass writes into it from many threads; the validate pass only
/// reads. Values are JSON so they can be persisted in the result cache.
#[derive(Debug, Default)]
pub struct RuleStorage {
    inner: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl RuleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what `rule_id` collected from `file`.
    pub fn collect(&self, rule_id: &str, file: &str, info: Value) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(rule_id.to_string())
            .or_default()
            .insert(file.to_string(), info);
    }

    /// Everything `rule_id` collected, keyed by file.
    pub fn collected(&self, rule_id: &str) -> HashMap<String, Value> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(rule_id).cloned().unwrap_or_default()
    }

    pub fn get(&self, rule_id: &str, file: &str) -> Option<Value> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(rule_id).and_then(|files| files.get(file)).cloned()
    }
}
