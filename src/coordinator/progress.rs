use crate::deferred::CompletionState;
use serde::Serialize;

/// Point-in-time view of a coordinator's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot<K> {
    pub name: String,
    pub state: CompletionState,
    pub started: bool,
    pub end_due: bool,
    /// Number of times the end hook ran
    pub end_invocations: usize,
    /// Every key submitted, in submission order
    pub mapped: Vec<K>,
    pub in_flight: usize,
    pub resolved: Vec<K>,
    pub rejected: Vec<K>,
    /// Results waiting for a reduce function
    pub pending_reduces: usize,
}

impl<K> ProgressSnapshot<K> {
    pub fn is_quiescent(&self) -> bool {
        self.in_flight == 0 && self.pending_reduces == 0 && !self.state.is_terminal()
    }

    /// Mapped keys that neither resolved nor rejected
    pub fn unsettled(&self) -> usize {
        self.mapped
            .len()
            .saturating_sub(self.resolved.len() + self.rejected.len())
    }
}

impl<K: Serialize> ProgressSnapshot<K> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
