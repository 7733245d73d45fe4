//! Common test utilities and helpers
#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Route coordinator events through the test harness's captured output
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("iterative_mapreduce=trace")
        .with_test_writer()
        .try_init();
}

/// Temporary directory holding one configuration file
pub struct ConfigFixture {
    temp_dir: TempDir,
    path: PathBuf,
}

impl ConfigFixture {
    /// Write `content` to `iterative.toml` in a fresh directory
    pub fn new(content: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("iterative.toml");
        fs::write(&path, content)?;
        Ok(Self { temp_dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path in the same directory that does not exist
    pub fn missing(&self) -> PathBuf {
        self.temp_dir.path().join("absent.toml")
    }
}
