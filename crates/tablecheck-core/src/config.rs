//! Configuration schema (tablecheck.toml)

use crate::message::Level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_row_start() -> usize {
    2
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Sheet row number of the first data row (the header is row 1)
    #[serde(default = "default_row_start")]
    pub row_start: usize,

    /// Directory for `<table>_distinct` outputs
    #[serde(default)]
    pub distinct: Option<PathBuf>,

    /// Message table (CSV or TSV by extension)
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// JSON report
    #[serde(default)]
    pub report: Option<PathBuf>,

    /// Lowest level that makes a run fail
    #[serde(default)]
    pub fail_on: Level,

    /// Base directory for resolving relative paths
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            row_start: default_row_start(),
            distinct: None,
            output: None,
            report: None,
            fail_on: Level::Error,
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        let config: Config =
            toml::from_str(toml).map_err(|e| SettingsError::ParseError(e.to_string()))?;
        if config.row_start < 2 {
            return Err(SettingsError::ParseError(format!(
                "row_start must be at least 2, got {}",
                config.row_start
            )));
        }
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| SettingsError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.project_root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.row_start, 2);
        assert_eq!(config.fail_on, Level::Error);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = Config::from_toml("fail_on = \"WARN\"\ndistinct = \"out\"\n").unwrap();
        assert_eq!(config.row_start, 2);
        assert_eq!(config.fail_on, Level::Warn);
        assert_eq!(config.distinct, Some(PathBuf::from("out")));
    }

    #[test]
    fn row_start_below_two_rejected() {
        assert!(Config::from_toml("row_start = 1").is_err());
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.row_start, parsed.row_start);
    }
}
