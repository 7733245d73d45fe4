use super::Config;
use crate::error::{common, ErrorExt};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::fs;

/// Loads configuration from TOML files and the environment.
///
/// The loaded configuration is shared behind a lock so that a long-lived
/// process can hand out fresh copies after a reload.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config: Arc<RwLock<Config>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file, replacing the current configuration.
    ///
    /// A missing file keeps the defaults.
    pub async fn load_file(&self, path: &Path) -> Result<()> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .await
            .to_config_error(format!("Failed to read configuration from {}", path.display()))?;
        let config = Config::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Load a file that must exist
    pub async fn load_required(&self, path: &Path) -> Result<()> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(common::config_not_found(path).into());
        }
        self.load_file(path).await
    }

    /// Apply `ITERATIVE_*` environment overrides on top of the loaded values
    pub fn apply_env(&self) -> Result<()> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config
            .merge_env_vars()
            .context("Failed to apply environment overrides")?;
        Ok(())
    }

    pub fn get_config(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
