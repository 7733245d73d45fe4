//! Application-level helpers
//!
//! Hosts that embed coordinators use these to turn configuration into a
//! logging setup:
//! - Configuration handling
//! - Logging setup

pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::{init_logging, init_tracing};
