//! Configuration for coordinators and the logging layer
//!
//! Configuration is plain data: it can be built in code, parsed from TOML
//! and overridden from the environment. Nothing here is required to run a
//! coordinator; `Coordinator::new()` uses `CoordinatorConfig::default()`.

use crate::app::AppConfig;
use crate::error::{common, ErrorCode, IterativeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod loader;

pub use loader::ConfigLoader;

/// Environment variable overriding [`CoordinatorConfig::name`]
pub const ENV_NAME: &str = "ITERATIVE_NAME";
/// Environment variable overriding [`CoordinatorConfig::duplicate_remap`]
pub const ENV_DUPLICATE_REMAP: &str = "ITERATIVE_DUPLICATE_REMAP";
/// Environment variable overriding [`LoggingConfig::verbose`]
pub const ENV_VERBOSE: &str = "ITERATIVE_VERBOSE";

/// Highest verbosity level with a distinct meaning
pub const MAX_VERBOSITY: u8 = 3;

/// What the end step does when every key it re-injected was already mapped.
///
/// Re-injecting only known keys starts no work, so no completion will ever
/// re-run the termination check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRemapPolicy {
    /// Treat the cycle as if nothing was re-injected and auto-resolve
    #[default]
    Resolve,
    /// Leave the process pending; the caller must settle it
    Stall,
}

impl fmt::Display for DuplicateRemapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Stall => write!(f, "stall"),
        }
    }
}

impl FromStr for DuplicateRemapPolicy {
    type Err = IterativeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resolve" => Ok(Self::Resolve),
            "stall" => Ok(Self::Stall),
            other => Err(IterativeError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("Unknown duplicate remap policy '{}'", other),
            )),
        }
    }
}

/// Per-coordinator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Label recorded on every log event emitted by the coordinator
    pub name: String,
    pub duplicate_remap: DuplicateRemapPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: "iterative".to_string(),
            duplicate_remap: DuplicateRemapPolicy::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_duplicate_remap(mut self, policy: DuplicateRemapPolicy) -> Self {
        self.duplicate_remap = policy;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 0 = info, 1 = debug, 2 = trace, 3 = trace with thread ids and lines
    pub verbose: u8,
}

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(common::invalid_toml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coordinator.name.trim().is_empty() {
            return Err(common::empty_field("coordinator.name"));
        }

        if self.logging.verbose > MAX_VERBOSITY {
            return Err(IterativeError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!(
                    "verbosity {} exceeds maximum of {}",
                    self.logging.verbose, MAX_VERBOSITY
                ),
                Some("logging.verbose".to_string()),
            ));
        }

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Tests use this instead of mutating the process environment.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_NAME) {
            self.coordinator.name = name;
        }

        if let Some(policy) = lookup(ENV_DUPLICATE_REMAP) {
            self.coordinator.duplicate_remap = policy
                .parse()
                .map_err(|_| common::invalid_env_override(ENV_DUPLICATE_REMAP, &policy))?;
        }

        if let Some(verbose) = lookup(ENV_VERBOSE) {
            self.logging.verbose = verbose
                .parse::<u8>()
                .map_err(|_| common::invalid_env_override(ENV_VERBOSE, &verbose))?;
        }

        self.validate()
    }

    /// Logging settings in the shape expected by [`crate::app::logging`]
    pub fn app_config(&self) -> AppConfig {
        AppConfig::new(self.logging.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.coordinator.name, "iterative");
        assert_eq!(
            config.coordinator.duplicate_remap,
            DuplicateRemapPolicy::Resolve
        );
        assert_eq!(config.logging.verbose, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = Config::from_toml_str(
            r#"
            [coordinator]
            duplicate_remap = "stall"
            "#,
        )
        .unwrap();

        assert_eq!(config.coordinator.name, "iterative");
        assert_eq!(config.coordinator.duplicate_remap, DuplicateRemapPolicy::Stall);
    }

    #[test]
    fn test_from_toml_rejects_bad_syntax() {
        let err = Config::from_toml_str("[coordinator\nname = 1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
    }

    #[test]
    fn test_from_toml_rejects_empty_name() {
        let err = Config::from_toml_str("[coordinator]\nname = \"  \"").unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_EMPTY_NAME);
    }

    #[test]
    fn test_validate_verbosity_range() {
        let mut config = Config::new();
        config.logging.verbose = 9;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_OUT_OF_RANGE);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::new();
        config
            .merge_env_from(env(&[
                (ENV_NAME, "crawler"),
                (ENV_DUPLICATE_REMAP, "Stall"),
                (ENV_VERBOSE, "2"),
            ]))
            .unwrap();

        assert_eq!(config.coordinator.name, "crawler");
        assert_eq!(config.coordinator.duplicate_remap, DuplicateRemapPolicy::Stall);
        assert_eq!(config.logging.verbose, 2);
    }

    #[test]
    fn test_env_override_invalid_value() {
        let mut config = Config::new();
        let err = config
            .merge_env_from(env(&[(ENV_VERBOSE, "loud")]))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_ENV_OVERRIDE);
    }

    #[test]
    fn test_policy_display_round_trips_through_parse() {
        for policy in [DuplicateRemapPolicy::Resolve, DuplicateRemapPolicy::Stall] {
            assert_eq!(policy.to_string().parse::<DuplicateRemapPolicy>().unwrap(), policy);
        }
        assert!("sometimes".parse::<DuplicateRemapPolicy>().is_err());
    }
}
