//! Configuration for studycards
//!
//! Settings come from an optional TOML file and are then overridden by
//! `STUDYCARDS_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const APP_DIR: &str = "studycards";
const CONFIG_FILE: &str = "config.toml";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Namespace for deriving stable workspace ids from workspace names
const WORKSPACE_NAMESPACE: Uuid = Uuid::from_u128(0x5c1d_2f4e_8a6b_4c3d_9e0f_1a2b_3c4d_5e6f);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Where workspaces are stored
    pub data_dir: PathBuf,
    /// Name of the workspace used when none is given on the command line
    pub workspace: String,
    /// Subject that receives cards when their subject is deleted with reassignment
    pub default_subject: String,
    /// Log filter used unless RUST_LOG is set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().unwrap_or_else(|_| PathBuf::from(APP_DIR)),
            workspace: "default".to_string(),
            default_subject: "General".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Get the default data directory
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .ok_or(ConfigError::DataDirNotFound)
}

/// Location of the config file in the user's config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
}

/// Stable id for a workspace name
pub fn workspace_id(name: &str) -> Uuid {
    Uuid::new_v5(&WORKSPACE_NAMESPACE, name.trim().as_bytes())
}

impl Config {
    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, else the user config file if present, else defaults.
    /// Environment overrides are applied and the result validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Loading config from {:?}", path);
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("STUDYCARDS_DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(workspace) = lookup("STUDYCARDS_WORKSPACE") {
            self.workspace = workspace;
        }
        if let Some(subject) = lookup("STUDYCARDS_DEFAULT_SUBJECT") {
            self.default_subject = subject;
        }
        if let Some(level) = lookup("STUDYCARDS_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.workspace.trim().is_empty() {
            return Err(ConfigError::Invalid("workspace must not be empty".into()));
        }
        if self.default_subject.trim().is_empty() {
            return Err(ConfigError::Invalid("default_subject must not be empty".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level {:?} (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Id of the configured workspace
    pub fn workspace_id(&self) -> Uuid {
        workspace_id(&self.workspace)
    }
}
