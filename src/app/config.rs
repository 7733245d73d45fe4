//! Application configuration
//!
//! Verbosity-driven settings for processes that host coordinators.

/// Application configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Self {
        Self { verbose }
    }

    /// Get the log filter directive based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,tokio=debug,runtime=debug",
        }
    }
}
