//! Settle-once completion cell
//!
//! A [`Deferred`] starts pending and is settled exactly once, either resolved
//! with a value or rejected with a reason. Every clone observes the same
//! state, so one party can settle while others query or wait.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────┐  resolve(value)  ┌──────────┐
//! │ Pending │ ───────────────> │ Resolved │
//! └────┬────┘                  └──────────┘
//!      │ reject(reason)        ┌──────────┐
//!      └─────────────────────> │ Rejected │
//!                              └──────────┘
//! ```
//!
//! Settling a terminal deferred is a no-op that returns `false`.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

pub mod work;

pub use work::{IntoWork, Work};

/// Observable completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Pending,
    Resolved,
    Rejected,
}

impl CompletionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Terminal value of a [`Deferred`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, R> {
    Resolved(T),
    Rejected(R),
}

impl<T, R> Outcome<T, R> {
    pub fn state(&self) -> CompletionState {
        match self {
            Self::Resolved(_) => CompletionState::Resolved,
            Self::Rejected(_) => CompletionState::Rejected,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn into_result(self) -> Result<T, R> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

struct Inner<T, R> {
    outcome: Mutex<Option<Outcome<T, R>>>,
    notify: Notify,
}

/// Shared handle to a settle-once completion cell
pub struct Deferred<T, R> {
    inner: Arc<Inner<T, R>>,
}

impl<T, R> Clone for Deferred<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> Default for Deferred<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> fmt::Debug for Deferred<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("state", &self.state())
            .finish()
    }
}

impl<T, R> Deferred<T, R> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                outcome: Mutex::new(None),
                notify: Notify::new(),
            }),
        }
    }

    /// Create an already-resolved deferred
    pub fn resolved(value: T) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    /// Create an already-rejected deferred
    pub fn rejected(reason: R) -> Self {
        let deferred = Self::new();
        deferred.reject(reason);
        deferred
    }

    /// Resolve with `value`. Returns `false` if already terminal.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Outcome::Resolved(value))
    }

    /// Reject with `reason`. Returns `false` if already terminal.
    pub fn reject(&self, reason: R) -> bool {
        self.settle(Outcome::Rejected(reason))
    }

    fn settle(&self, outcome: Outcome<T, R>) -> bool {
        {
            let mut slot = self
                .inner
                .outcome
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
        }
        self.inner.notify.notify_waiters();
        true
    }

    pub fn state(&self) -> CompletionState {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(CompletionState::Pending, Outcome::state)
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// True when both handles point at the same cell
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone, R: Clone> Deferred<T, R> {
    /// Current outcome, if settled
    pub fn outcome(&self) -> Option<Outcome<T, R>> {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until the deferred is settled
    pub async fn settled(&self) -> Outcome<T, R> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a settle between the check and the
            // await is not missed.
            notified.as_mut().enable();

            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }
}
