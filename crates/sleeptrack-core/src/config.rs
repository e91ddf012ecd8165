//! Configuration management for sleeptrack.
//!
//! Loads configuration from ${SLEEPTRACK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::DEFAULT_TIME_FORMAT;

/// Default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for sleeptrack configuration and data.
    //!
    //! SLEEPTRACK_HOME resolution order:
    //! 1. SLEEPTRACK_HOME environment variable (if set)
    //! 2. ~/.config/sleeptrack (default)
    //! 3. ./.sleeptrack when no home directory can be found

    use std::path::PathBuf;

    /// Returns the sleeptrack home directory.
    pub fn sleeptrack_home() -> PathBuf {
        if let Ok(home) = std::env::var("SLEEPTRACK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".sleeptrack"),
            |h| h.join(".config").join("sleeptrack"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sleeptrack_home().join("config.toml")
    }

    /// Returns the default database path.
    pub fn database_path() -> PathBuf {
        sleeptrack_home().join("sleep.db")
    }

    /// Returns the directory interactive sessions log into.
    pub fn logs_dir() -> PathBuf {
        sleeptrack_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file (defaults to $SLEEPTRACK_HOME/sleep.db)
    pub database_path: Option<String>,

    /// chrono format string for history timestamps
    pub time_format: String,

    /// Ask before clearing history in the interactive UI
    pub confirm_clear: bool,

    /// How long a notice stays visible, in seconds
    pub notice_secs: u64,
}

impl Config {
    const DEFAULT_NOTICE_SECS: u64 = 4;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolved database path.
    ///
    /// Relative paths in the config are taken relative to SLEEPTRACK_HOME.
    pub fn database_path(&self) -> PathBuf {
        match self.database_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                let path = PathBuf::from(path);
                if path.is_absolute() {
                    path
                } else {
                    paths::sleeptrack_home().join(path)
                }
            }
            _ => paths::database_path(),
        }
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            confirm_clear: true,
            notice_secs: Self::DEFAULT_NOTICE_SECS,
        }
    }
}
