//! Configuration file management.
//!
//! Handles reading and writing `config.toml` under the per-user config
//! directory. Every key is optional; a missing file yields defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// User configuration stored in `~/.config/cellar/config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub gpg: GpgConfig,
}

/// Where the password store lives.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store root; defaults to `~/.password-store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// How to reach the OpenPGP backend.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpgConfig {
    /// Pinned primary candidate (name on PATH or absolute path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Alternate keyring home passed as `--homedir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    /// Key identifier written to a fresh store's root `.gpg-id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key_id: Option<String>,
}

impl Config {
    /// Default config location: `$XDG_CONFIG_HOME/cellar/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// `path` if given, otherwise the default location.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed. A missing
    /// file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the store root, falling back to `~/.password-store`.
    pub fn store_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.store.root {
            return Ok(root.clone());
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(constants::DEFAULT_STORE_DIR))
    }

    /// Primary binary candidate.
    pub fn primary_binary(&self) -> &str {
        self.gpg
            .binary
            .as_deref()
            .unwrap_or(constants::PRIMARY_BINARY)
    }
}
