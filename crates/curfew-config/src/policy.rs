//! Validated configuration structures

use crate::schema::{RawConfig, RawFetchFailure, RawTimeConfig};
use std::time::Duration;

/// Default remote time endpoint
pub const DEFAULT_TIME_ENDPOINT: &str = "https://worldtimeapi.org/api/timezone/America/Sao_Paulo";

/// Default period between curfew re-evaluations
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRY_INITIAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_secs(300);

/// Upper bound for every configured duration (one day)
pub const MAX_DURATION_SECONDS: u64 = 24 * 60 * 60;

/// Validated configuration ready for use by the service
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub time: TimeServiceConfig,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            time: TimeServiceConfig::from_raw(raw.time),
        }
    }
}

/// Remote time service and polling settings
#[derive(Debug, Clone)]
pub struct TimeServiceConfig {
    pub endpoint: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub on_fetch_failure: FetchFailurePolicy,
}

impl TimeServiceConfig {
    fn from_raw(raw: RawTimeConfig) -> Self {
        let retry = match raw.retry_initial_seconds {
            Some(0) => RetryPolicy::disabled(),
            initial => RetryPolicy::Backoff {
                initial: initial
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_INITIAL),
                max: raw
                    .retry_max_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_MAX),
            },
        };

        Self {
            endpoint: raw
                .endpoint
                .unwrap_or_else(|| DEFAULT_TIME_ENDPOINT.to_string()),
            refresh_interval: raw
                .refresh_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
            request_timeout: raw
                .request_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            retry,
            on_fetch_failure: match raw.on_fetch_failure {
                Some(RawFetchFailure::RetainLastKnown) => FetchFailurePolicy::RetainLastKnown,
                Some(RawFetchFailure::Clear) | None => FetchFailurePolicy::Clear,
            },
        }
    }
}

impl Default for TimeServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawTimeConfig::default())
    }
}

/// How soon to try again after a failed time fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Only the periodic tick retries
    Disabled,
    /// Retry after `initial`, doubling on each consecutive failure up to `max`
    Backoff { initial: Duration, max: Duration },
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self::Disabled
    }

    /// Delay before the retry following `consecutive_failures` failures (>= 1)
    pub fn delay_for(&self, consecutive_failures: u32) -> Option<Duration> {
        match *self {
            RetryPolicy::Disabled => None,
            RetryPolicy::Backoff { initial, max } => {
                let exponent = consecutive_failures.saturating_sub(1).min(16);
                let delay = initial.saturating_mul(1u32 << exponent);
                Some(delay.min(max))
            }
        }
    }
}

/// Effect of a failed fetch on the last known hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Forget the hour; the front-end fails closed until a fetch succeeds
    #[default]
    Clear,
    /// Keep evaluating against the last hour that was successfully fetched
    RetainLastKnown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_values() {
        let config = Config::default();
        assert_eq!(config.time.endpoint, DEFAULT_TIME_ENDPOINT);
        assert_eq!(config.time.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.time.on_fetch_failure, FetchFailurePolicy::Clear);
        assert_eq!(
            config.time.retry,
            RetryPolicy::Backoff {
                initial: Duration::from_secs(5),
                max: Duration::from_secs(300),
            }
        );
    }

    #[test]
    fn zero_initial_disables_retry() {
        let raw = RawTimeConfig {
            retry_initial_seconds: Some(0),
            ..Default::default()
        };
        let config = TimeServiceConfig::from_raw(raw);
        assert_eq!(config.retry, RetryPolicy::Disabled);
        assert_eq!(config.retry.delay_for(3), None);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let retry = RetryPolicy::Backoff {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(60),
        };

        assert_eq!(retry.delay_for(1), Some(Duration::from_secs(5)));
        assert_eq!(retry.delay_for(2), Some(Duration::from_secs(10)));
        assert_eq!(retry.delay_for(3), Some(Duration::from_secs(20)));
        assert_eq!(retry.delay_for(4), Some(Duration::from_secs(40)));
        assert_eq!(retry.delay_for(5), Some(Duration::from_secs(60)));
        assert_eq!(retry.delay_for(500), Some(Duration::from_secs(60)));
    }
}
