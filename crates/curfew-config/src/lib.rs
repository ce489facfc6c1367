//! Configuration parsing and validation for curfew
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Remote time endpoint and polling interval
//! - Retry backoff and fetch-failure behavior
//! - Validation with clear error messages
//!
//! The configuration file is optional; every setting has a built-in default.

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Config::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;
