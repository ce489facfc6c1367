//! Time utilities for curfew
//!
//! The curfew only ever looks at the hour of the day, so the central type
//! here is [`Hour`], a validated 0–23 value.
//!
//! # Mock Hour for Development
//!
//! In debug builds, the `CURFEW_MOCK_HOUR` environment variable pins the hour
//! reported to the session controller, bypassing the remote time service.
//! This is useful for trying out the curfew and picker states by hand.
//!
//! Example:
//! ```bash
//! CURFEW_MOCK_HOUR=23 cargo run -p curfewd
//! ```

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for the mock hour (debug builds only)
pub const MOCK_HOUR_ENV_VAR: &str = "CURFEW_MOCK_HOUR";

static MOCK_HOUR: OnceLock<Option<Hour>> = OnceLock::new();

/// An hour of the day in the range 0–23
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Hour(u8);

impl Hour {
    pub const MIDNIGHT: Hour = Hour(0);

    pub fn new(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self(hour))
    }

    /// Hour of `dt` as seen in its own timezone (not the host's)
    pub fn of<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self(dt.hour() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Iterate every hour of the day, starting at midnight
    pub fn all() -> impl Iterator<Item = Hour> {
        (0..24).map(Hour)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl TryFrom<u8> for Hour {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Hour::new(value).ok_or_else(|| format!("hour out of range: {}", value))
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> Self {
        hour.0
    }
}

/// Parse a mock hour string (`0`–`23`)
pub fn parse_mock_hour(value: &str) -> Option<Hour> {
    value.trim().parse::<u8>().ok().and_then(Hour::new)
}

/// Returns the pinned development hour, if one is set.
///
/// Always `None` in release builds.
pub fn mock_hour() -> Option<Hour> {
    *MOCK_HOUR.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(raw) = std::env::var(MOCK_HOUR_ENV_VAR) {
                match parse_mock_hour(&raw) {
                    Some(hour) => {
                        tracing::info!(mock_hour = %hour, "Mock hour enabled");
                        return Some(hour);
                    }
                    None => {
                        tracing::warn!(
                            mock_hour = %raw,
                            expected = "integer 0-23",
                            "Invalid mock hour"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
