//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults, then the TOML file, then
//! `SOLARA__*` environment variables (`__` separates nested keys, e.g.
//! `SOLARA__ENDPOINTS__LOGIN`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use solara_http::{DEFAULT_TIMEOUT, EndpointConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base address of the loyalty API
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Session file; defaults to `session.json` in the data directory
    pub storage_path: Option<PathBuf>,
    pub endpoints: EndpointConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(10_000),
            storage_path: None,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, reading `path` when it exists
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("SOLARA").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn storage_path(&self, data_dir: &Path) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| data_dir.join("session.json"))
    }
}

/// Data directory: explicit flag or `SOLARA_STATE_DIR`, else the platform data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("solara")
    })
}
