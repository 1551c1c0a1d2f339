//! Configuration loading and management
//!
//! Handles parsing of `trak.toml` and resolution of the data directory
//! the document store writes into.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the document files live. Defaults to the platform data
    /// directory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Reminder scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// Reminder scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between deadline checks
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_tick_secs() -> u64 {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a `trak.toml` file
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the per-user config directory, or return defaults when no
    /// file exists or it fails to parse.
    pub fn load_default() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data directory after applying precedence: explicit override, then
    /// the config file, then the platform default.
    pub fn resolve_data_dir(&self, override_dir: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        default_data_dir().ok_or(Error::NoDataDir)
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.tick_secs == 0 {
            return Err(Error::InvalidConfig(
                "scheduler.tick_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory for trak documents.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "trak").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path of the per-user `trak.toml`, when a config directory exists.
pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "trak").map(|dirs| dirs.config_dir().join("trak.toml"))
}
