//! Termination check and end-step decisions
//!
//! Pure functions: the engine gathers counters, these decide what happens
//! next. Keeping them free of state makes the races between "more work was
//! discovered" and "nothing is in flight" easy to test in isolation.
//!
//! ```text
//!            settlement / reduce / start
//!                       │
//!                       ▼
//!               ┌──────────────┐  no
//!               │  quiescent?  │ ────> wait for more settlements
//!               └──────┬───────┘
//!                      │ yes
//!                      ▼
//!               ┌──────────────┐  none   sealed? ── yes ──> auto-resolve
//!               │  end hook?   │ ──────>    │
//!               └──────┬───────┘            └─ no ──> end due, fire on set
//!                      │ run hook
//!                      ▼
//!   no keys ──> auto-resolve          new work ──> next cycle
//!   only skipped keys ──> re-check    only duplicates ──> policy
//! ```

use crate::config::DuplicateRemapPolicy;

/// Nothing in flight, nothing buffered, not yet settled
pub(crate) fn is_quiescent(in_flight: usize, buffered_reduces: usize, terminal: bool) -> bool {
    in_flight == 0 && buffered_reduces == 0 && !terminal
}

/// What the end hook did during one end step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EndReport {
    /// Keys passed to the hook's remap callback
    pub collected: usize,
    /// Of those, keys that were not mapped before
    pub admitted: usize,
    /// Work in flight after submitting the collected keys
    pub in_flight: usize,
    /// Whether the coordinator is settled after the hook returned
    pub terminal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndDecision {
    /// The hook (or a caller) already settled the coordinator
    AlreadySettled,
    /// Resolve with the current accumulator
    AutoResolve,
    /// New work is in flight; its settlements drive the next check
    AwaitCycle,
    /// New keys were mapped but produced no work: run the check again
    Recheck,
    /// Only duplicates were re-injected and the policy says to wait
    Stall,
}

pub(crate) fn decide_after_end(report: EndReport, policy: DuplicateRemapPolicy) -> EndDecision {
    if report.terminal {
        return EndDecision::AlreadySettled;
    }
    if report.collected == 0 {
        return EndDecision::AutoResolve;
    }
    if report.in_flight > 0 {
        return EndDecision::AwaitCycle;
    }
    if report.admitted > 0 {
        return EndDecision::Recheck;
    }
    match policy {
        DuplicateRemapPolicy::Resolve => EndDecision::AutoResolve,
        DuplicateRemapPolicy::Stall => EndDecision::Stall,
    }
}
