//! Logging configuration and initialization
//!
//! Coordinators only emit `tracing` events; a host decides where they go.
//! These helpers install the usual formatted subscriber.

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG` takes precedence over the verbosity level when set. Returns
/// `false` if a global subscriber was already installed.
pub fn init_logging(config: &AppConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(config.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(config.verbose >= 3) // Show line numbers for -vvv
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialized with verbosity level: {}", config.verbose);
        trace!("Log filter: {}", config.log_level());
    }
    installed
}

/// Initialize tracing with just a verbosity level
pub fn init_tracing(verbose: u8) -> bool {
    init_logging(&AppConfig::new(verbose))
}
