//! Shell configuration
//!
//! Loaded from an optional JSON file, then overridden by command-line flags.
//! Every field has a default, so `{}` is a complete configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::executor::{DEFAULT_DATA_DIR, DEFAULT_METADATA_KEY};
use crate::observability::Severity;

use super::args::{Cli, DEFAULT_CONFIG_PATH};
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of per-table documents (default "data")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Metadata document path (default "db_meta.json")
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Ask before drop_table and delete (default true)
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    /// Print "Function ... executed in ..." lines (default true)
    #[serde(default = "default_true")]
    pub show_timing: bool,

    /// Minimum log severity (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}
fn default_metadata_file() -> String {
    DEFAULT_METADATA_KEY.to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            metadata_file: default_metadata_file(),
            confirm_destructive: true,
            show_timing: true,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Builds the effective configuration for a command line.
    ///
    /// An explicit `--config` must exist. The implicit default path is
    /// optional and falls back to defaults when absent.
    pub fn resolve(cli: &Cli) -> CliResult<Self> {
        let mut config = match cli.explicit_config() {
            Some(path) => Self::load(path)?,
            None => match fs::metadata(DEFAULT_CONFIG_PATH) {
                Ok(_) => Self::load(Path::new(DEFAULT_CONFIG_PATH))?,
                Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(CliError::config_error(format!("Failed to read config: {}", e))),
            },
        };

        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line flags on top of file values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(file) = &cli.metadata_file {
            self.metadata_file = file.clone();
        }
        if cli.yes {
            self.confirm_destructive = false;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.metadata_file.trim().is_empty() {
            return Err(CliError::config_error("metadata_file must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`.
    pub fn severity(&self) -> CliResult<Severity> {
        Severity::from_str(&self.log_level).map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, value: serde_json::Value) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("tabledb.json");
        fs::write(&config_path, value.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir, json!({}));

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.metadata_file, "db_meta.json");
        assert!(config.confirm_destructive);
        assert!(config.show_timing);
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir, json!({"log_level": "verbose"}));

        let err = Config::load(&config_path).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_rejects_empty_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir, json!({"data_dir": ""}));

        assert!(Config::load(&config_path).is_err());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let cli = Cli {
            config: Some(temp_dir.path().join("absent.json")),
            ..Cli::default()
        };

        assert_eq!(Config::resolve(&cli).unwrap_err().code(), CliErrorCode::ConfigError);
    }

    #[test]
    fn test_flags_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            json!({"data_dir": "tables", "log_level": "error"}),
        );
        let cli = Cli {
            config: Some(config_path),
            data_dir: Some("other".into()),
            yes: true,
            ..Cli::default()
        };

        let config = Config::resolve(&cli).unwrap();
        assert_eq!(config.data_dir, "other");
        assert_eq!(config.log_level, "error");
        assert!(!config.confirm_destructive);
    }
}
