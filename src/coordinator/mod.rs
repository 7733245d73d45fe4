//! Iterative map/reduce coordinator
//!
//! A [`Coordinator`] maps keys to asynchronous [`Work`](crate::deferred::Work), folds successful
//! results into an accumulator and lets the reducer or the end hook discover
//! more keys. The process repeats until nothing is in flight and the end
//! step injects no new keys, at which point the coordinator resolves with
//! the accumulator.
//!
//! ## Lifecycle
//!
//! ```text
//!  configure ──> start ──> map keys ──> settle ──> reduce ──┐
//!                              ▲                            │ remap
//!                              └────────────────────────────┘
//!                              ▲
//!                  end remap   │        quiescent
//!                              └──── end step ──> resolve
//! ```
//!
//! Every key is mapped at most once. Keys whose work fails land in
//! [`ProgressSnapshot::rejected`]; they never fail the coordinator, only an
//! explicit `reject` does.
//!
//! ```
//! use iterative_mapreduce::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let coordinator: Coordinator<u32, u32, u32, String> = Coordinator::with_keys([1, 2, 3]);
//! coordinator
//!     .reduce(|acc, value, _ctx| acc + value)
//!     .map(|key: &u32| Work::value(key * 2));
//!
//! assert_eq!(coordinator.wait().await, Ok(12));
//! # }
//! ```
//!
//! Hooks run while the coordinator is locked. Use the context they receive
//! to remap keys; forced settlement is safe through either the context or a
//! handle.

mod context;
mod engine;
mod progress;
mod reduce;
mod registry;
mod termination;


pub use context::{EndContext, ReduceContext};
pub use progress::ProgressSnapshot;
pub use registry::{default_equality, EqualityFn};

use crate::config::CoordinatorConfig;
use crate::deferred::{CompletionState, Deferred, IntoWork};
use engine::State;
use futures::future::BoxFuture;
use futures::FutureExt;
use registry::Spawner;
use std::any::Any;
use std::fmt;
use std::future::IntoFuture;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Requirements on coordinator keys
pub trait Key: Clone + fmt::Debug + Send + 'static {}

impl<T> Key for T where T: Clone + fmt::Debug + Send + 'static {}

struct Shared<K, V, A, E> {
    state: Mutex<State<K, V, A, E>>,
    completion: Deferred<A, E>,
}

impl<K, V, A, E> Shared<K, V, A, E>
where
    K: Key,
    V: Send + 'static,
    A: Default + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Run `f` under the lock, then fold in whatever settled meanwhile
    fn with_state<T>(&self, f: impl FnOnce(&mut State<K, V, A, E>) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let output = f(&mut state);
        state.drain();
        output
    }

    fn settle(&self, key: K, result: Result<V, E>) {
        self.with_state(|state| state.on_settled(key, result));
    }

    fn settle_panicked(&self, key: K, message: String) {
        self.with_state(|state| state.on_panicked(key, &message));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Iterative map/reduce coordinator.
///
/// `K` is the key type, `V` the value produced by mapped work, `A` the
/// accumulator and `E` the error type shared by mapped work and the
/// coordinator itself. Handles are cheap to clone and share one process.
///
/// Pending work is spawned with [`tokio::spawn`], so keys that map to
/// futures must be submitted from within a Tokio runtime. A future that
/// panics counts as rejected work: its key lands in
/// [`ProgressSnapshot::rejected`] and the coordinator carries on.
pub struct Coordinator<K, V, A, E> {
    shared: Arc<Shared<K, V, A, E>>,
}

impl<K, V, A, E> Clone for Coordinator<K, V, A, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V, A, E> Coordinator<K, V, A, E>
where
    K: Key + PartialEq,
    V: Send + 'static,
    A: Default + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self::build(&config, default_equality())
    }

    /// Create a coordinator whose `start` maps `keys`
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let coordinator = Self::new();
        let keys = keys.into_iter().collect();
        coordinator.shared.with_state(|state| state.set_initial(keys));
        coordinator
    }
}

impl<K, V, A, E> Default for Coordinator<K, V, A, E>
where
    K: Key + PartialEq,
    V: Send + 'static,
    A: Default + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, A, E> Coordinator<K, V, A, E>
where
    K: Key,
    V: Send + 'static,
    A: Default + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Create a coordinator that deduplicates keys with `equality`
    pub fn with_equality<F>(equality: F) -> Self
    where
        F: Fn(&K, &K) -> bool + Send + Sync + 'static,
    {
        Self::build(&CoordinatorConfig::default(), Box::new(equality))
    }

    fn build(config: &CoordinatorConfig, equality: EqualityFn<K>) -> Self {
        let completion = Deferred::new();
        let shared = Arc::new_cyclic(|weak: &Weak<Shared<K, V, A, E>>| {
            let weak = weak.clone();
            let spawner: Spawner<K, V, E> =
                Arc::new(move |key: K, future: BoxFuture<'static, Result<V, E>>| {
                    let Some(shared) = weak.upgrade() else {
                        return;
                    };
                    tokio::spawn(async move {
                        match AssertUnwindSafe(future).catch_unwind().await {
                            Ok(result) => shared.settle(key, result),
                            Err(payload) => {
                                shared.settle_panicked(key, panic_message(&*payload))
                            }
                        }
                    });
                });

            Shared {
                state: Mutex::new(State::new(
                    config,
                    completion.clone(),
                    equality,
                    spawner,
                )),
                completion,
            }
        });

        Self { shared }
    }

    /// Set the map function. Starts the process if initial keys are waiting.
    pub fn map<F, W>(&self, mut map_fn: F) -> &Self
    where
        F: FnMut(&K) -> W + Send + 'static,
        W: IntoWork<V, E>,
    {
        self.shared.with_state(|state| {
            state.set_map(Box::new(move |key: &K| map_fn(key).into_work()));
        });
        self
    }

    /// Set the reduce function, replaying results that arrived before it
    pub fn reduce<F>(&self, reduce_fn: F) -> &Self
    where
        F: FnMut(A, V, &mut ReduceContext<'_, K, V, A, E>) -> A + Send + 'static,
    {
        self.shared
            .with_state(|state| state.set_reduce(Box::new(reduce_fn), None));
        self
    }

    /// Set the reduce function together with the accumulator's seed
    pub fn reduce_with<F>(&self, reduce_fn: F, initial: A) -> &Self
    where
        F: FnMut(A, V, &mut ReduceContext<'_, K, V, A, E>) -> A + Send + 'static,
    {
        self.shared
            .with_state(|state| state.set_reduce(Box::new(reduce_fn), Some(initial)));
        self
    }

    /// Replace the accumulator
    pub fn init(&self, initial: A) -> &Self {
        self.shared.with_state(|state| state.set_accumulator(initial));
        self
    }

    /// Set the end hook. If the coordinator is already quiescent it runs now.
    pub fn end<F>(&self, end_fn: F) -> &Self
    where
        F: FnMut(&A, &mut EndContext<'_, K, A, E>) + Send + 'static,
    {
        self.shared.with_state(|state| state.set_end(Box::new(end_fn)));
        self
    }

    /// Replace the key equality used for deduplication
    pub fn set_equality<F>(&self, equality: F) -> &Self
    where
        F: Fn(&K, &K) -> bool + Send + Sync + 'static,
    {
        self.shared
            .with_state(|state| state.set_equality(Box::new(equality)));
        self
    }

    /// Start with the keys given to [`with_keys`](Self::with_keys), if any
    pub fn start(&self) -> &Self {
        self.shared.with_state(|state| state.start(None));
        self
    }

    /// Start with `keys`, overriding any initial keys
    pub fn start_with<I>(&self, keys: I) -> &Self
    where
        I: IntoIterator<Item = K>,
    {
        let keys = keys.into_iter().collect();
        self.shared.with_state(|state| state.start(Some(keys)));
        self
    }

    /// Whether the coordinator has settled.
    ///
    /// Without an end hook, a quiescent coordinator only resolves once its
    /// outcome is awaited through [`wait`](Self::wait) or `.await`. Until
    /// then this reports `false` and [`progress`](Self::progress) shows
    /// `end_due`.
    pub fn is_terminal(&self) -> bool {
        self.shared.completion.is_terminal()
    }

    /// Current completion state. Like [`is_terminal`](Self::is_terminal), it
    /// stays [`CompletionState::Pending`] for a quiescent coordinator without
    /// an end hook until someone awaits it.
    pub fn state(&self) -> CompletionState {
        self.shared.completion.state()
    }

    /// Force the coordinator to resolve with `value`
    pub fn resolve(&self, value: A) -> bool {
        self.shared.completion.resolve(value)
    }

    /// Force the coordinator to reject with `reason`
    pub fn reject(&self, reason: E) -> bool {
        self.shared.completion.reject(reason)
    }

    pub fn progress(&self) -> ProgressSnapshot<K> {
        self.shared.with_state(|state| state.progress())
    }

    pub fn name(&self) -> String {
        self.shared.with_state(|state| state.name().to_string())
    }

    /// Wait for the coordinator to settle.
    ///
    /// Awaiting the outcome without an end hook lets the coordinator resolve
    /// with its accumulator as soon as it becomes quiescent.
    pub async fn wait(&self) -> Result<A, E>
    where
        A: Clone,
        E: Clone,
    {
        self.shared.with_state(State::seal);
        self.shared.completion.settled().await.into_result()
    }
}

impl<K, V, A, E> IntoFuture for Coordinator<K, V, A, E>
where
    K: Key,
    V: Send + 'static,
    A: Default + Clone + Send + 'static,
    E: fmt::Debug + Clone + Send + 'static,
{
    type Output = Result<A, E>;
    type IntoFuture = BoxFuture<'static, Result<A, E>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl<K, V, A, E> fmt::Debug for Coordinator<K, V, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.shared.completion.state())
            .finish_non_exhaustive()
    }
}
