//! Configuration parser for loading configuration files.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{AutomvError, ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::AutomvConfig;

/// Configuration parser for loading automv configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path used to find `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<AutomvConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(AutomvError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AutomvError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string. An empty document yields the
    /// default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<AutomvConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(AutomvConfig::default());
        }

        let config: AutomvConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            AutomvError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Parsed configuration with {} ignore rules", config.ignore.len());
        Ok(config)
    }

    /// Loads configuration from `path` (or defaults when `None`) and applies
    /// environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// holds an invalid value.
    pub fn load_with_env(&self, path: Option<&Path>) -> Result<AutomvConfig> {
        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => AutomvConfig::default(),
        };

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Applies `AUTOMV_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if `AUTOMV_OUTPUT` is not a known format.
    pub fn apply_env_overrides<F>(config: &mut AutomvConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin) = lookup("AUTOMV_TERRAFORM_BIN") {
            debug!("Overriding terraform_bin from environment");
            config.terraform_bin = bin;
        }

        if let Some(output) = lookup("AUTOMV_OUTPUT") {
            debug!("Overriding output from environment");
            config.output = output
                .parse()
                .map_err(|message: String| ConfigError::validation(message, "AUTOMV_OUTPUT"))?;
        }

        if let Some(moves_file) = lookup("AUTOMV_MOVES_FILE") {
            debug!("Overriding moves_file from environment");
            config.moves_file = moves_file;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                AutomvError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Configuration file names searched in each directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    ".automv.yaml",
    ".automv.yml",
    "automv.yaml",
    "automv.yml",
];

/// Finds the configuration file in `start_dir` or its parents, falling back
/// to `automv/config.yaml` under the user's configuration directory.
///
/// Returns `None` when no file exists; running without one is valid.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.is_file() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("automv").join("config.yaml");
    if user_config.is_file() {
        info!("Using user configuration: {}", user_config.display());
        return Some(user_config);
    }

    debug!("No configuration file found");
    None
}
