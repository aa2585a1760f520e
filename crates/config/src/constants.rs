//! Default filesystem locations for provaudit

use std::path::PathBuf;

pub const APP_DIR: &str = "provaudit";
pub const CONFIG_FILE: &str = "config.toml";

/// Directory for debug log files
#[must_use]
pub fn logs_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("logs")
}

/// Staging root used when none is configured
#[must_use]
pub fn default_staging_root() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}
