//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Remote time service settings
    #[serde(default)]
    pub time: RawTimeConfig,
}

/// Time service settings; every field falls back to a built-in default
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTimeConfig {
    /// URL of the remote time endpoint
    pub endpoint: Option<String>,

    /// Period of the curfew re-evaluation tick
    pub refresh_interval_seconds: Option<u64>,

    /// Timeout for a single time request
    pub request_timeout_seconds: Option<u64>,

    /// First retry delay after a failed fetch (0 disables fast retries)
    pub retry_initial_seconds: Option<u64>,

    /// Upper bound for the retry backoff
    pub retry_max_seconds: Option<u64>,

    /// "clear" or "retain_last_known"
    pub on_fetch_failure: Option<RawFetchFailure>,
}

/// What a failed fetch does to the last known hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFetchFailure {
    Clear,
    RetainLastKnown,
}
