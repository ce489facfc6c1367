//! Default paths for curfew components
//!
//! The config file lives at `$XDG_CONFIG_HOME/curfew/config.toml` or
//! `~/.config/curfew/config.toml`. `$CURFEW_CONFIG` overrides both.

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const CURFEW_CONFIG_ENV: &str = "CURFEW_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "curfew";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$CURFEW_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/curfew/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/curfew/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CURFEW_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the CURFEW_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    // Last resort
    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}
