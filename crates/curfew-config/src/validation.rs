//! Configuration validation

use crate::policy::{DEFAULT_RETRY_INITIAL, DEFAULT_RETRY_MAX, MAX_DURATION_SECONDS};
use crate::schema::{RawConfig, RawTimeConfig};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid time endpoint '{value}': {message}")]
    InvalidEndpoint { value: String, message: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} ({value}) exceeds the maximum of {max} seconds")]
    DurationTooLong {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("retry_max_seconds ({max}) is less than retry_initial_seconds ({initial})")]
    RetryMaxBelowInitial { initial: u64, max: u64 },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    validate_time(&config.time)
}

fn validate_time(time: &RawTimeConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(endpoint) = &time.endpoint
        && let Err(message) = validate_endpoint(endpoint)
    {
        errors.push(ValidationError::InvalidEndpoint {
            value: endpoint.clone(),
            message,
        });
    }

    let durations = [
        ("refresh_interval_seconds", time.refresh_interval_seconds),
        ("request_timeout_seconds", time.request_timeout_seconds),
        ("retry_initial_seconds", time.retry_initial_seconds),
        ("retry_max_seconds", time.retry_max_seconds),
    ];
    for (field, value) in durations {
        match value {
            // A zero initial delay means "no fast retry"
            Some(0) if field != "retry_initial_seconds" => {
                errors.push(ValidationError::ZeroDuration { field });
            }
            Some(value) if value > MAX_DURATION_SECONDS => {
                errors.push(ValidationError::DurationTooLong {
                    field,
                    value,
                    max: MAX_DURATION_SECONDS,
                });
            }
            _ => {}
        }
    }

    // Compare the effective values; an unset side takes its default
    let initial = time
        .retry_initial_seconds
        .unwrap_or(DEFAULT_RETRY_INITIAL.as_secs());
    let max = time
        .retry_max_seconds
        .unwrap_or(DEFAULT_RETRY_MAX.as_secs());
    if initial > 0 && max > 0 && max < initial {
        errors.push(ValidationError::RetryMaxBelowInitial { initial, max });
    }

    errors
}

/// Check that an endpoint is an absolute http(s) URL with a host
pub fn validate_endpoint(endpoint: &str) -> Result<(), String> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| "must start with http:// or https://".to_string())?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err("missing host".into());
    }

    if endpoint.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".into());
    }

    Ok(())
}
