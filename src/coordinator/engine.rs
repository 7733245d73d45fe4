//! Coordinator state machine
//!
//! [`State`] is everything the coordinator owns. It is only ever touched
//! behind the coordinator lock; every entry point finishes with [`State::drain`]
//! so work that settled synchronously is folded in before the lock is released.

use super::context::EndContext;
use super::progress::ProgressSnapshot;
use super::reduce::{ReduceFn, ReduceStage};
use super::registry::{Dispatcher, EqualityFn, Ledger, MapFn, Settlement, Spawner};
use super::termination::{decide_after_end, is_quiescent, EndDecision, EndReport};
use super::Key;
use crate::config::{CoordinatorConfig, DuplicateRemapPolicy};
use crate::deferred::Deferred;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Boxed end-step hook
pub(crate) type EndFn<K, A, E> = Box<dyn for<'a> FnMut(&A, &mut EndContext<'a, K, A, E>) + Send>;

pub(crate) struct State<K, V, A, E> {
    name: Arc<str>,
    policy: DuplicateRemapPolicy,
    completion: Deferred<A, E>,
    dispatch: Dispatcher<K, V, E>,
    reduce: ReduceStage<K, V, A, E>,
    ledger: Ledger<K>,
    end_fn: Option<EndFn<K, A, E>>,
    /// Quiescence was reached at least once
    end_due: bool,
    /// Someone is awaiting the outcome
    sealed: bool,
    initial: Option<Vec<K>>,
    started: bool,
    end_invocations: usize,
}

impl<K, V, A, E> State<K, V, A, E>
where
    K: Key,
    V: Send + 'static,
    A: Default + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    pub fn new(
        config: &CoordinatorConfig,
        completion: Deferred<A, E>,
        equality: EqualityFn<K>,
        spawner: Spawner<K, V, E>,
    ) -> Self {
        let name: Arc<str> = Arc::from(config.name.as_str());
        Self {
            dispatch: Dispatcher::new(Arc::clone(&name), equality, spawner),
            name,
            policy: config.duplicate_remap,
            completion,
            reduce: ReduceStage::new(),
            ledger: Ledger::default(),
            end_fn: None,
            end_due: false,
            sealed: false,
            initial: None,
            started: false,
            end_invocations: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fold in every settlement queued by the current entry point
    pub fn drain(&mut self) {
        while let Some(Settlement { key, result }) = self.dispatch.next_ready() {
            self.on_settled(key, result);
        }
    }

    /// Account for one unit of work that settled
    pub fn on_settled(&mut self, key: K, result: Result<V, E>) {
        if !self.complete(&key) {
            return;
        }

        match result {
            Ok(value) => {
                trace!(coordinator = %self.name, ?key, "Work resolved");
                self.ledger.resolved.push(key.clone());
                self.launch_reduce(key, value);
            }
            Err(error) => {
                debug!(coordinator = %self.name, ?key, ?error, "Work rejected");
                self.ledger.rejected.push(key);
                self.check_finish();
            }
        }
    }

    /// Account for spawned work whose future panicked
    pub fn on_panicked(&mut self, key: K, message: &str) {
        if !self.complete(&key) {
            return;
        }
        warn!(coordinator = %self.name, ?key, panic = message, "Work panicked, counting it as rejected");
        self.ledger.rejected.push(key);
        self.check_finish();
    }

    /// Release one in-flight slot. Returns `false` once the coordinator has settled.
    fn complete(&mut self, key: &K) -> bool {
        self.dispatch.complete_one();

        if self.completion.is_terminal() {
            trace!(
                coordinator = %self.name,
                ?key,
                in_flight = self.dispatch.in_flight(),
                "Ignoring completion after coordinator settled"
            );
            return false;
        }
        true
    }

    fn launch_reduce(&mut self, key: K, value: V) {
        if !self.reduce.is_configured() {
            trace!(
                coordinator = %self.name,
                ?key,
                buffered = self.reduce.buffered() + 1,
                "No reduce function yet, buffering result"
            );
            self.reduce.buffer(key, value);
            return;
        }
        self.apply_reduce(key, value);
    }

    fn apply_reduce(&mut self, key: K, value: V) {
        self.reduce.apply(
            &key,
            value,
            &mut self.dispatch,
            &self.ledger,
            &self.completion,
        );
        self.check_finish();
    }

    pub fn set_map(&mut self, map_fn: MapFn<K, V, E>) {
        if self.dispatch.has_map_fn() {
            debug!(coordinator = %self.name, "Replacing map function");
        }
        self.dispatch.set_map_fn(map_fn);

        if !self.started && self.initial.is_some() {
            self.start(None);
        }
    }

    /// Install the reducer and replay results that arrived before it
    pub fn set_reduce(&mut self, func: ReduceFn<K, V, A, E>, initial: Option<A>) {
        self.reduce.set_fn(func);
        if let Some(initial) = initial {
            self.reduce.set_accumulator(initial);
        }

        let buffered = self.reduce.buffered();
        if buffered == 0 {
            return;
        }
        debug!(coordinator = %self.name, buffered, "Replaying buffered results");

        while let Some((key, value)) = self.reduce.next_buffered() {
            if self.completion.is_terminal() {
                let dropped = self.reduce.discard_buffer() + 1;
                debug!(
                    coordinator = %self.name,
                    dropped,
                    "Discarding buffered results after coordinator settled"
                );
                return;
            }
            self.apply_reduce(key, value);
        }
    }

    pub fn set_accumulator(&mut self, value: A) {
        self.reduce.set_accumulator(value);
    }

    /// Install the end hook; fires right away if the end step is already due
    pub fn set_end(&mut self, end_fn: EndFn<K, A, E>) {
        self.end_fn = Some(end_fn);
        if self.end_due {
            debug!(coordinator = %self.name, "End step already due, running new end hook");
            self.check_finish();
        }
    }

    pub fn set_equality(&mut self, equality: EqualityFn<K>) {
        self.dispatch.set_equality(equality);
    }

    pub fn set_initial(&mut self, keys: Vec<K>) {
        self.initial = Some(keys);
    }

    /// Submit the initial keys. A no-op after the first effective call.
    pub fn start(&mut self, keys: Option<Vec<K>>) {
        if self.started {
            trace!(coordinator = %self.name, "Already started");
            return;
        }
        if let Some(keys) = keys {
            self.initial = Some(keys);
        }

        let keys = self.initial.take().unwrap_or_default();
        if !keys.is_empty() && !self.dispatch.has_map_fn() {
            debug!(
                coordinator = %self.name,
                keys = keys.len(),
                "No map function yet, deferring start"
            );
            self.initial = Some(keys);
            return;
        }

        self.started = true;
        info!(coordinator = %self.name, keys = keys.len(), "Starting coordinator");

        for key in keys {
            if self.completion.is_terminal() {
                debug!(coordinator = %self.name, "Coordinator settled during start");
                break;
            }
            self.dispatch.submit(key);
        }
        self.check_finish();
    }

    /// Mark the outcome as awaited and run the default end step if it is due
    pub fn seal(&mut self) {
        if self.sealed {
            return;
        }
        self.sealed = true;
        if self.end_due && self.end_fn.is_none() {
            self.check_finish();
        }
    }

    /// Termination check: run the end step whenever the coordinator is quiescent
    fn check_finish(&mut self) {
        loop {
            if !is_quiescent(
                self.dispatch.in_flight(),
                self.reduce.buffered(),
                self.completion.is_terminal(),
            ) {
                return;
            }
            self.end_due = true;

            let Some(end_fn) = self.end_fn.as_mut() else {
                if self.sealed {
                    self.auto_resolve();
                } else {
                    debug!(coordinator = %self.name, "Quiescent without an end hook, end step deferred");
                }
                return;
            };

            self.end_invocations += 1;
            debug!(
                coordinator = %self.name,
                cycle = self.end_invocations,
                resolved = self.ledger.resolved.len(),
                rejected = self.ledger.rejected.len(),
                "Running end step"
            );

            let mut context = EndContext::new(&self.ledger, &self.completion);
            end_fn(self.reduce.accumulator(), &mut context);
            let collected = context.into_collected();

            let report = self.submit_remaps(collected);
            match decide_after_end(report, self.policy) {
                EndDecision::AlreadySettled => {
                    debug!(coordinator = %self.name, state = %self.completion.state(), "End hook settled coordinator");
                    return;
                }
                EndDecision::AwaitCycle => {
                    debug!(
                        coordinator = %self.name,
                        admitted = report.admitted,
                        in_flight = report.in_flight,
                        "End hook started a new cycle"
                    );
                    return;
                }
                EndDecision::Recheck => {
                    trace!(coordinator = %self.name, admitted = report.admitted, "Remapped keys produced no work, checking again");
                }
                EndDecision::AutoResolve => {
                    self.auto_resolve();
                    return;
                }
                EndDecision::Stall => {
                    warn!(
                        coordinator = %self.name,
                        collected = report.collected,
                        "End hook only remapped keys that were already mapped; coordinator stays pending"
                    );
                    return;
                }
            }
        }
    }

    fn submit_remaps(&mut self, collected: Vec<K>) -> EndReport {
        let count = collected.len();
        let mut admitted = 0;

        if !self.completion.is_terminal() {
            for key in collected {
                if self.dispatch.submit(key) {
                    admitted += 1;
                }
            }
        }

        EndReport {
            collected: count,
            admitted,
            in_flight: self.dispatch.in_flight(),
            terminal: self.completion.is_terminal(),
        }
    }

    fn auto_resolve(&mut self) {
        let value = self.reduce.take_accumulator();
        if self.completion.resolve(value) {
            info!(
                coordinator = %self.name,
                mapped = self.dispatch.mapped().len(),
                resolved = self.ledger.resolved.len(),
                rejected = self.ledger.rejected.len(),
                "Coordinator resolved"
            );
        }
    }

    pub fn progress(&self) -> ProgressSnapshot<K> {
        ProgressSnapshot {
            name: self.name.to_string(),
            state: self.completion.state(),
            started: self.started,
            end_due: self.end_due,
            end_invocations: self.end_invocations,
            mapped: self.dispatch.mapped().to_vec(),
            in_flight: self.dispatch.in_flight(),
            resolved: self.ledger.resolved.clone(),
            rejected: self.ledger.rejected.clone(),
            pending_reduces: self.reduce.buffered(),
        }
    }
}
