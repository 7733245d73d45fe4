//! Key registry and work dispatch
//!
//! Every key submitted to a coordinator passes through [`Dispatcher::submit`]:
//! duplicates (per the configured equality function) are dropped, new keys
//! are appended to the append-only mapped ledger and handed to the map
//! function, and the resulting [`Work`] is tracked as in flight.

use super::Key;
use crate::deferred::Work;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Pairwise key equality used for deduplication
pub type EqualityFn<K> = Box<dyn Fn(&K, &K) -> bool + Send + Sync>;

/// Boxed map function, already normalised to [`Work`]
pub(crate) type MapFn<K, V, E> = Box<dyn FnMut(&K) -> Work<V, E> + Send>;

/// Hands a pending future to the runtime together with its key
pub(crate) type Spawner<K, V, E> = Arc<dyn Fn(K, BoxFuture<'static, Result<V, E>>) + Send + Sync>;

/// Equality through `PartialEq`
pub fn default_equality<K: PartialEq + 'static>() -> EqualityFn<K> {
    Box::new(|a: &K, b: &K| a == b)
}

/// Append-only ledger of submitted keys
pub(crate) struct KeyRegistry<K> {
    mapped: Vec<K>,
    equality: EqualityFn<K>,
}

impl<K> KeyRegistry<K> {
    pub fn new(equality: EqualityFn<K>) -> Self {
        Self {
            mapped: Vec::new(),
            equality,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.mapped.iter().any(|seen| (self.equality)(key, seen))
    }

    /// Record `key` unless an equal key was recorded before
    pub fn admit(&mut self, key: K) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.mapped.push(key);
        true
    }

    pub fn set_equality(&mut self, equality: EqualityFn<K>) {
        self.equality = equality;
    }

    pub fn mapped(&self) -> &[K] {
        &self.mapped
    }
}

/// Resolved and rejected keys, in completion order
pub(crate) struct Ledger<K> {
    pub resolved: Vec<K>,
    pub rejected: Vec<K>,
}

impl<K> Default for Ledger<K> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// A settled unit of work waiting to be folded into the coordinator
pub(crate) struct Settlement<K, V, E> {
    pub key: K,
    pub result: Result<V, E>,
}

/// Owns the mapping side of a coordinator: registry, map function, in-flight
/// count and the queue of work that settled synchronously.
pub(crate) struct Dispatcher<K, V, E> {
    name: Arc<str>,
    registry: KeyRegistry<K>,
    map_fn: Option<MapFn<K, V, E>>,
    in_flight: usize,
    ready: VecDeque<Settlement<K, V, E>>,
    spawner: Spawner<K, V, E>,
}

impl<K: Key, V, E> Dispatcher<K, V, E> {
    pub fn new(name: Arc<str>, equality: EqualityFn<K>, spawner: Spawner<K, V, E>) -> Self {
        Self {
            name,
            registry: KeyRegistry::new(equality),
            map_fn: None,
            in_flight: 0,
            ready: VecDeque::new(),
            spawner,
        }
    }

    /// Submit a key for mapping. Returns `false` if it was not mapped.
    pub fn submit(&mut self, key: K) -> bool {
        if !self.registry.admit(key.clone()) {
            trace!(coordinator = %self.name, ?key, "Key already mapped, skipping");
            return false;
        }

        let work = match self.map_fn.as_mut() {
            Some(map_fn) => map_fn(&key),
            None => {
                warn!(
                    coordinator = %self.name,
                    ?key,
                    "Key submitted before a map function was configured; it produces no work"
                );
                Work::Skip
            }
        };

        match work {
            Work::Skip => {
                debug!(coordinator = %self.name, ?key, "Map function produced no work");
            }
            Work::Ready(result) => {
                self.in_flight += 1;
                trace!(coordinator = %self.name, ?key, in_flight = self.in_flight, "Queued ready work");
                self.ready.push_back(Settlement { key, result });
            }
            Work::Pending(future) => {
                self.in_flight += 1;
                trace!(coordinator = %self.name, ?key, in_flight = self.in_flight, "Spawned pending work");
                (self.spawner)(key, future);
            }
        }

        true
    }

    /// Account for one settled unit of work
    pub fn complete_one(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn next_ready(&mut self) -> Option<Settlement<K, V, E>> {
        self.ready.pop_front()
    }

    pub fn set_map_fn(&mut self, map_fn: MapFn<K, V, E>) {
        self.map_fn = Some(map_fn);
    }

    pub fn has_map_fn(&self) -> bool {
        self.map_fn.is_some()
    }

    pub fn set_equality(&mut self, equality: EqualityFn<K>) {
        self.registry.set_equality(equality);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn mapped(&self) -> &[K] {
        self.registry.mapped()
    }
}
