//! Test helper functions and custom assertions

pub mod assertions;

use crate::coordinator::{Coordinator, Key};
use std::fmt;
use std::time::Duration;

/// Upper bound used by tests that expect a coordinator to settle
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Wait for `coordinator` to settle, giving up after `limit`
pub async fn wait_within<K, V, A, E>(
    coordinator: &Coordinator<K, V, A, E>,
    limit: Duration,
) -> Option<Result<A, E>>
where
    K: Key,
    V: Send + 'static,
    A: Default + Clone + Send + 'static,
    E: fmt::Debug + Clone + Send + 'static,
{
    tokio::time::timeout(limit, coordinator.wait()).await.ok()
}
