//! Testing utilities and fixtures
//!
//! Helpers for driving a coordinator deterministically: work that settles on
//! demand or after a delay, a log of map invocations, graph fixtures for
//! traversal tests and assertions over progress snapshots.

pub mod fixtures;
pub mod helpers;

pub use fixtures::builders::{Graph, GraphBuilder};
pub use fixtures::{
    delayed_failure, delayed_value, manual_work, yielding_value, CallLog, Trigger,
};
pub use helpers::assertions::{assert_in_flight, assert_progress_consistent, assert_same_keys};
pub use helpers::{wait_within, DEFAULT_WAIT};
