//! Work fixtures

pub mod builders;

use crate::deferred::{Deferred, IntoWork, Work};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Settles the work returned alongside it by [`manual_work`]
pub struct Trigger<V, E> {
    deferred: Deferred<V, E>,
}

impl<V, E> Trigger<V, E> {
    pub fn resolve(&self, value: V) -> bool {
        self.deferred.resolve(value)
    }

    pub fn reject(&self, error: E) -> bool {
        self.deferred.reject(error)
    }

    pub fn is_settled(&self) -> bool {
        self.deferred.is_terminal()
    }
}

impl<V, E> fmt::Debug for Trigger<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("state", &self.deferred.state())
            .finish()
    }
}

/// Work that stays pending until the returned trigger settles it
pub fn manual_work<V, E>() -> (Work<V, E>, Trigger<V, E>)
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let deferred = Deferred::new();
    let work = deferred.clone().into_work();
    (work, Trigger { deferred })
}

/// Work that succeeds with `value` after `delay`
pub fn delayed_value<V, E>(value: V, delay: Duration) -> Work<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    Work::future(async move {
        tokio::time::sleep(delay).await;
        Ok(value)
    })
}

/// Work that fails with `error` after `delay`
pub fn delayed_failure<V, E>(error: E, delay: Duration) -> Work<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    Work::future(async move {
        tokio::time::sleep(delay).await;
        Err(error)
    })
}

/// Work that yields to the scheduler once before succeeding
pub fn yielding_value<V, E>(value: V) -> Work<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    Work::future(async move {
        tokio::task::yield_now().await;
        Ok(value)
    })
}

/// Shared record of the keys a map function was called with
pub struct CallLog<K> {
    calls: Arc<Mutex<Vec<K>>>,
}

impl<K> Clone for CallLog<K> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<K> Default for CallLog<K> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<K: Clone + PartialEq> CallLog<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: &K) {
        self.lock().push(key.clone());
    }

    /// Every recorded call, in call order
    pub fn calls(&self) -> Vec<K> {
        self.lock().clone()
    }

    pub fn count(&self, key: &K) -> usize {
        self.lock().iter().filter(|seen| *seen == key).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<K>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
