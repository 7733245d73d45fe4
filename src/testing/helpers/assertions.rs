//! Custom test assertions for coordinator bookkeeping
#![allow(clippy::uninlined_format_args)]

use crate::coordinator::ProgressSnapshot;
use std::fmt::Debug;

/// Assert that a coordinator resolves with the expected value
#[macro_export]
macro_rules! assert_resolves {
    ($coordinator:expr, $expected:expr) => {{
        match $crate::testing::wait_within(&$coordinator, $crate::testing::DEFAULT_WAIT).await {
            Some(Ok(value)) => assert_eq!(value, $expected),
            Some(Err(e)) => panic!("Expected coordinator to resolve, got rejection: {:?}", e),
            None => panic!("Coordinator did not settle within {:?}", $crate::testing::DEFAULT_WAIT),
        }
    }};
}

/// Assert that a coordinator rejects and return the reason
#[macro_export]
macro_rules! assert_rejects {
    ($coordinator:expr) => {{
        match $crate::testing::wait_within(&$coordinator, $crate::testing::DEFAULT_WAIT).await {
            Some(Ok(value)) => panic!("Expected coordinator to reject, got value: {:?}", value),
            Some(Err(e)) => e,
            None => panic!("Coordinator did not settle within {:?}", $crate::testing::DEFAULT_WAIT),
        }
    }};
}

/// Assert that two key lists hold the same keys, ignoring order
pub fn assert_same_keys<K: Ord + Clone + Debug>(actual: &[K], expected: &[K]) {
    let mut actual = actual.to_vec();
    let mut expected = expected.to_vec();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected, "Key sets differ");
}

/// Assert the bookkeeping invariants of a progress snapshot:
/// mapped keys are distinct, every settled key was mapped and no key is both
/// resolved and rejected.
pub fn assert_progress_consistent<K: PartialEq + Debug>(progress: &ProgressSnapshot<K>) {
    for (index, key) in progress.mapped.iter().enumerate() {
        assert!(
            !progress.mapped[..index].contains(key),
            "Key {:?} mapped twice",
            key
        );
    }

    for key in progress.resolved.iter().chain(&progress.rejected) {
        assert!(
            progress.mapped.contains(key),
            "Settled key {:?} was never mapped",
            key
        );
    }

    for key in &progress.resolved {
        assert!(
            !progress.rejected.contains(key),
            "Key {:?} both resolved and rejected",
            key
        );
    }

    assert!(
        progress.resolved.len() + progress.rejected.len() + progress.in_flight
            <= progress.mapped.len(),
        "More keys settled or in flight than mapped: {:?}",
        progress
    );
}

/// Assert the exact in-flight count of a coordinator that has not settled:
/// every mapped key is resolved, rejected, skipped by the map function, or
/// still in flight.
pub fn assert_in_flight<K: PartialEq + Debug>(progress: &ProgressSnapshot<K>, skipped: usize) {
    assert_progress_consistent(progress);
    assert!(
        !progress.state.is_terminal(),
        "In-flight accounting only holds before the coordinator settles: {:?}",
        progress
    );

    let unsettled = progress
        .mapped
        .len()
        .saturating_sub(progress.resolved.len() + progress.rejected.len() + skipped);
    assert_eq!(
        progress.in_flight, unsettled,
        "In-flight count does not match unsettled keys ({} skipped)",
        skipped
    );
}
