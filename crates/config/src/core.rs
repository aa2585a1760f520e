//! Configuration sections

use provaudit_types::{ColorChoice, DecodePolicy, OutputFormat, PathMatch, RegistryBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
    /// Versions audited concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default)]
    pub fail_on_mismatch: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
            jobs: 4,
            fail_on_mismatch: false,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            connect_timeout: 10,
            retries: 0,
            retry_delay: 1,
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

/// Package registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub backend: RegistryBackend,
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    /// Interpreter used by the pip backend
    #[serde(default = "default_python")]
    pub python: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryBackend::Api,
            base_url: default_registry_url(),
            python: default_python(),
        }
    }
}

/// Source hosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingConfig {
    #[serde(default = "default_hosting_url")]
    pub base_url: String,
    /// Prepended to the version to form the tag name
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosting_url(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

/// Staging area configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    #[serde(default = "default_staging_enabled")]
    pub enabled: bool,
    pub root: Option<PathBuf>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
        }
    }
}

/// Comparator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(default)]
    pub decode_policy: DecodePolicy,
    #[serde(default)]
    pub path_match: PathMatch,
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_jobs() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    0
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_registry_url() -> String {
    "https://pypi.org".to_string()
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_hosting_url() -> String {
    "https://github.com".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_staging_enabled() -> bool {
    true
}
