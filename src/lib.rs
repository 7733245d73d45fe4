//! # Iterative MapReduce
//!
//! A self-feeding asynchronous map/reduce coordinator: map keys to futures,
//! fold the results into an accumulator, and let the reducer or the end hook
//! discover more keys until nothing is left to do.
//!
//! ## Usage
//!
//! ```
//! use iterative_mapreduce::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let edges = |node: &u32| match node {
//!     1 => vec![2, 3],
//!     2 => vec![3, 1],
//!     _ => vec![],
//! };
//!
//! let walk: Coordinator<u32, Vec<u32>, usize, String> = Coordinator::with_keys([1]);
//! walk.reduce(|visited, neighbours, ctx| {
//!     for next in neighbours {
//!         ctx.remap(next);
//!     }
//!     visited + 1
//! })
//! .map(move |node: &u32| Work::value(edges(node)));
//!
//! assert_eq!(walk.wait().await, Ok(3));
//! # }
//! ```
//!
//! ## Modules
//!
//! - `coordinator` - The iterative map/reduce coordinator and its hook contexts
//! - `deferred` - Settle-once completion cell and map-result normalisation
//! - `config` - Coordinator and logging configuration (TOML + environment)
//! - `app` - Logging initialisation
//! - `error` - Error types with numeric codes
//! - `testing` - Fixtures and assertions for coordinator tests
pub mod app;
pub mod config;
pub mod coordinator;
pub mod deferred;
pub mod error;

pub mod testing;

#[cfg(test)]
mod property_tests;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{CoordinatorConfig, DuplicateRemapPolicy};
    pub use crate::coordinator::{Coordinator, EndContext, ProgressSnapshot, ReduceContext};
    pub use crate::deferred::{CompletionState, Deferred, IntoWork, Outcome, Work};
}
