//! Callback contexts handed to reduce and end hooks
//!
//! Hooks run while the coordinator is locked, so they must talk to the
//! coordinator through these contexts rather than through a
//! [`Coordinator`](super::Coordinator) handle.

use super::registry::{Dispatcher, Ledger};
use super::Key;
use crate::deferred::Deferred;
use tracing::debug;

/// Context for one reduce invocation
pub struct ReduceContext<'a, K, V, A, E> {
    pub(crate) key: &'a K,
    pub(crate) dispatch: &'a mut Dispatcher<K, V, E>,
    pub(crate) ledger: &'a Ledger<K>,
    pub(crate) completion: &'a Deferred<A, E>,
}

impl<K: Key, V, A, E> ReduceContext<'_, K, V, A, E> {
    /// The key whose work produced the value being reduced
    pub fn key(&self) -> &K {
        self.key
    }

    /// Map another key right away.
    ///
    /// Returns `false` when an equal key was already mapped or the
    /// coordinator is settled.
    pub fn remap(&mut self, key: K) -> bool {
        if self.completion.is_terminal() {
            debug!(?key, "Ignoring remap after completion");
            return false;
        }
        self.dispatch.submit(key)
    }

    /// Keys whose work succeeded so far, in completion order
    pub fn resolved(&self) -> &[K] {
        &self.ledger.resolved
    }

    /// Keys whose work failed so far, in completion order
    pub fn rejected(&self) -> &[K] {
        &self.ledger.rejected
    }

    /// Keys submitted so far, including this cycle's remaps
    pub fn mapped(&self) -> &[K] {
        self.dispatch.mapped()
    }

    /// Settle the whole process now with `value`
    pub fn resolve(&self, value: A) -> bool {
        self.completion.resolve(value)
    }

    /// Settle the whole process now as failed
    pub fn reject(&self, reason: E) -> bool {
        self.completion.reject(reason)
    }

    pub fn is_terminal(&self) -> bool {
        self.completion.is_terminal()
    }
}

/// Context for one end-step invocation.
///
/// Keys passed to [`remap`](EndContext::remap) are collected and mapped once
/// the hook returns; collecting at least one key starts a new cycle.
pub struct EndContext<'a, K, A, E> {
    pub(crate) collected: Vec<K>,
    pub(crate) ledger: &'a Ledger<K>,
    pub(crate) completion: &'a Deferred<A, E>,
}

impl<'a, K, A, E> EndContext<'a, K, A, E> {
    pub(crate) fn new(ledger: &'a Ledger<K>, completion: &'a Deferred<A, E>) -> Self {
        Self {
            collected: Vec::new(),
            ledger,
            completion,
        }
    }

    /// Queue a key to map after the hook returns
    pub fn remap(&mut self, key: K) {
        self.collected.push(key);
    }

    pub fn resolved(&self) -> &[K] {
        &self.ledger.resolved
    }

    pub fn rejected(&self) -> &[K] {
        &self.ledger.rejected
    }

    /// Settle the process with `value` instead of the accumulator
    pub fn resolve(&self, value: A) -> bool {
        self.completion.resolve(value)
    }

    pub fn reject(&self, reason: E) -> bool {
        self.completion.reject(reason)
    }

    pub fn is_terminal(&self) -> bool {
        self.completion.is_terminal()
    }

    pub(crate) fn into_collected(self) -> Vec<K> {
        self.collected
    }
}
