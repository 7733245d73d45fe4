//! Reduce stage: reducer, accumulator and the buffer of early results
//!
//! Work may settle before a reducer is configured. Those results wait here,
//! in arrival order, and are replayed as soon as a reducer is installed.

use super::context::ReduceContext;
use super::registry::{Dispatcher, Ledger};
use crate::deferred::Deferred;
use std::collections::VecDeque;
use std::mem;

/// Boxed reduce function
pub(crate) type ReduceFn<K, V, A, E> =
    Box<dyn for<'a> FnMut(A, V, &mut ReduceContext<'a, K, V, A, E>) -> A + Send>;

pub(crate) struct ReduceStage<K, V, A, E> {
    func: Option<ReduceFn<K, V, A, E>>,
    buffer: VecDeque<(K, V)>,
    accumulator: A,
}

impl<K, V, A: Default, E> ReduceStage<K, V, A, E> {
    pub fn new() -> Self {
        Self {
            func: None,
            buffer: VecDeque::new(),
            accumulator: A::default(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.func.is_some()
    }

    pub fn set_fn(&mut self, func: ReduceFn<K, V, A, E>) {
        self.func = Some(func);
    }

    pub fn set_accumulator(&mut self, value: A) {
        self.accumulator = value;
    }

    pub fn accumulator(&self) -> &A {
        &self.accumulator
    }

    /// Move the accumulator out, leaving `A::default()` behind
    pub fn take_accumulator(&mut self) -> A {
        mem::take(&mut self.accumulator)
    }

    pub fn buffer(&mut self, key: K, value: V) {
        self.buffer.push_back((key, value));
    }

    pub fn next_buffered(&mut self) -> Option<(K, V)> {
        self.buffer.pop_front()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop buffered results that can no longer be reduced
    pub fn discard_buffer(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }

    /// Fold one value into the accumulator.
    ///
    /// Returns `false` without touching anything if no reducer is configured.
    pub fn apply(
        &mut self,
        key: &K,
        value: V,
        dispatch: &mut Dispatcher<K, V, E>,
        ledger: &Ledger<K>,
        completion: &Deferred<A, E>,
    ) -> bool {
        let Some(func) = self.func.as_mut() else {
            return false;
        };

        let mut context = ReduceContext {
            key,
            dispatch,
            ledger,
            completion,
        };
        let previous = mem::take(&mut self.accumulator);
        self.accumulator = func(previous, value, &mut context);
        true
    }
}
