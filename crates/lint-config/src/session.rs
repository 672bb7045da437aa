//! Warn-once bookkeeping scoped to one lint invocation

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    seen: HashSet<String>,
    messages: Vec<String>,
}

/// Deduplicates warning-and-continue diagnostics.
///
/// One session lives for one invocation and is passed explicitly to every
/// resolution step; a warning keyed by the same string is emitted once no
/// matter how many files or documents trigger it.
#[derive(Debug, Default)]
pub struct WarningSession {
    state: Mutex<State>,
}

impl WarningSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `message` unless `key` was already reported. Returns whether it was emitted.
    pub fn warn_once(&self, key: impl Into<String>, message: impl Into<String>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.seen.insert(key.into()) {
            return false;
        }
        let message = message.into();
        tracing::warn!("{message}");
        state.messages.push(message);
        true
    }

    /// Warnings emitted so far, in order.
    pub fn warnings(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.messages.clone()
    }

    pub fn has_warned(&self, key: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.seen.contains(key)
    }
}
