use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub storyfire: StoryfireConfig,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Storyfire economy settings.
///
/// The store only persists balances; how often they replenish and what an
/// action costs is decided by the calling layer, which reads it from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryfireConfig {
    /// Daily allowance for free-tier profiles.
    pub free_daily: i64,
    /// Storyfire deducted per narrated action.
    pub cost_per_action: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            storyfire: StoryfireConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

impl Default for StoryfireConfig {
    fn default() -> Self {
        Self {
            free_daily: 40,
            cost_per_action: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/mythweaver/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("mythweaver"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("mythweaver").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
