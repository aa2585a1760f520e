#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for provaudit
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/provaudit/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{
    CompareConfig, GeneralConfig, HostingConfig, NetworkConfig, RegistryConfig, StagingConfig,
};

use provaudit_errors::{ConfigError, Error};
use provaudit_types::{ColorChoice, OutputFormat, RegistryBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub hosting: HostingConfig,

    #[serde(default)]
    pub staging: StagingConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config file");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Merge values from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PROVAUDIT_OUTPUT
        if let Some(output) = lookup("PROVAUDIT_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("PROVAUDIT_OUTPUT", output)),
            };
        }

        // PROVAUDIT_COLOR
        if let Some(color) = lookup("PROVAUDIT_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("PROVAUDIT_COLOR", color)),
            };
        }

        // PROVAUDIT_JOBS
        if let Some(jobs) = lookup("PROVAUDIT_JOBS") {
            self.general.jobs = jobs
                .parse()
                .map_err(|_| invalid("PROVAUDIT_JOBS", jobs))?;
        }

        // PROVAUDIT_TIMEOUT
        if let Some(timeout) = lookup("PROVAUDIT_TIMEOUT") {
            self.network.timeout = timeout
                .parse()
                .map_err(|_| invalid("PROVAUDIT_TIMEOUT", timeout))?;
        }

        // PROVAUDIT_INDEX_URL
        if let Some(url) = lookup("PROVAUDIT_INDEX_URL") {
            if url.is_empty() {
                return Err(invalid("PROVAUDIT_INDEX_URL", url));
            }
            self.registry.base_url = url;
        }

        // PROVAUDIT_REGISTRY_BACKEND
        if let Some(backend) = lookup("PROVAUDIT_REGISTRY_BACKEND") {
            self.registry.backend = backend
                .parse::<RegistryBackend>()
                .map_err(|value| invalid("PROVAUDIT_REGISTRY_BACKEND", value))?;
        }

        // PROVAUDIT_STAGING_DIR
        if let Some(dir) = lookup("PROVAUDIT_STAGING_DIR") {
            self.staging.root = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Get the staging root (with default)
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.staging
            .root
            .clone()
            .unwrap_or_else(constants::default_staging_root)
    }

    /// Number of versions to audit concurrently, at least one
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.general.jobs.max(1)
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
