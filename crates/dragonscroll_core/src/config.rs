//! Core configuration.
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (`~/.config/dragonscroll/config.toml`, or `DRAGONSCROLL_CONFIG`)
//! 3. Environment variables (`DRAGONSCROLL_*` prefix)
//!
//! Environment variables take precedence over config file values.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "DRAGONSCROLL";
const APP_DIR_NAME: &str = "dragonscroll";
const BOOKS_DB_FILE_NAME: &str = "books.sqlite3";
const PREFERENCES_FILE_NAME: &str = "preferences.json";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to create data directory `{path}`: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the book database and the preference file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level: `trace|debug|info|warn|error`.
    #[serde(default = "default_log_level_string")]
    pub log_level: String,

    /// Log directory; defaults to `<data_dir>/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default location and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// Environment variables are still applied as overrides. A missing file
    /// yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses configuration from a TOML string, then applies env overrides.
    pub fn load_from_str(toml_content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Configuration rooted at `data_dir`, ignoring file and environment.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DATA_DIR")) {
            if !val.is_empty() {
                self.data_dir = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_LOG_LEVEL")) {
            if !val.is_empty() {
                self.log_level = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_LOG_DIR")) {
            self.log_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Creates the data directory when missing.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::CreateDataDir {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Config file path, overridable with `DRAGONSCROLL_CONFIG`.
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{ENV_PREFIX}_CONFIG")) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join("config.toml")
    }

    pub fn books_db_path(&self) -> PathBuf {
        self.data_dir.join(BOOKS_DB_FILE_NAME)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE_NAME)
    }

    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LOG_DIR_NAME))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

fn default_log_level_string() -> String {
    crate::logging::default_log_level().to_string()
}
