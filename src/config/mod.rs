//! Configuration module for annoview
//!
//! Manages engine settings: page size, default tag match modes, log level
//! and the default dataset used by the command line front end.
//! Configuration is stored in the user's config directory and may be
//! overridden with `ANNOVIEW_*` environment variables.

use crate::filters::MatchMode;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Engine configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Items requested per page
    pub page_size: usize,

    /// How included tags combine by default
    pub include_match_mode: MatchMode,

    /// How excluded tags combine by default
    pub exclude_match_mode: MatchMode,

    /// Default log filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,

    /// Dataset file the CLI explores when `--data` is not given
    pub dataset: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            include_match_mode: MatchMode::Any,
            exclude_match_mode: MatchMode::Any,
            log_level: "warn".to_string(),
            dataset: None,
        }
    }
}

impl EngineConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("annoview").join("config.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file plus environment overrides
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an override cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("ANNOVIEW").try_parsing(true))
            .build()?;

        settings.try_deserialize::<Self>().map(Self::normalized)
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self
    }
}
