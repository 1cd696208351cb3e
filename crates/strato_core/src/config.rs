//! Storage configuration

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend holds the flat key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// In-process map; contents are gone when the process exits.
    #[serde(rename = "memory")]
    Memory,
    /// Durable RocksDB database under the data directory.
    #[serde(rename = "local")]
    Local,
}

/// Main storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Data directory for the local backend; resolved under the
    /// platform data dir when unset.
    pub data_dir: Option<PathBuf>,
    /// Deadline applied to every store call, in milliseconds.
    pub operation_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            data_dir: None,
            operation_timeout_ms: 10_000,
        }
    }
}

impl StorageConfig {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists yet.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("io", "StratoStore", "StratoStore")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Directory the local backend stores its database under.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            ProjectDirs::from("io", "StratoStore", "StratoStore")
                .map(|dirs| dirs.data_dir().join("store"))
                .unwrap_or_else(|| PathBuf::from("./store"))
        })
    }
}
