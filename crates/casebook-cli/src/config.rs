//! `casebook.toml`: optional file-level defaults for the CLI.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "casebook.toml";
pub const DEFAULT_RECORDS_PATH: &str = "case_records.txt";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Records file read and written by every command.
    pub records_path: PathBuf,

    /// When set, structural mutations are appended here as JSONL.
    pub undo_log_path: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            undo_log_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve relative paths against the directory holding the config file.
    fn anchored_at(mut self, base: &Path) -> Self {
        if self.records_path.is_relative() {
            self.records_path = base.join(&self.records_path);
        }
        if let Some(undo) = self.undo_log_path.as_mut()
            && undo.is_relative()
        {
            *undo = base.join(&*undo);
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Load configuration.
///
/// With no explicit path, a missing `casebook.toml` in the working directory
/// yields defaults. An explicit path must exist.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };

    let text = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = Config::parse(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok(config.anchored_at(base))
}
