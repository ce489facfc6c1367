//! Time source trait

use async_trait::async_trait;
use curfew_util::Hour;
use thiserror::Error;

/// Errors from a time fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The request could not complete (connectivity, timeout, non-success status)
    #[error("Time service unreachable: {0}")]
    Network(String),

    /// The service answered, but not with a usable reading
    #[error("Invalid time response: {0}")]
    Validation(String),
}

impl TimeError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TimeError::Network(_) => "network",
            TimeError::Validation(_) => "validation",
        }
    }
}

pub type TimeResult<T> = Result<T, TimeError>;

/// Source of the authoritative hour of day.
///
/// Implementations issue at most one request per call and never retry;
/// retry scheduling belongs to the caller.
#[async_trait]
pub trait TimeSource: Send + Sync {
    async fn fetch_current_hour(&self) -> TimeResult<Hour>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(TimeError::network("down").kind(), "network");
        assert_eq!(TimeError::validation("bad").kind(), "validation");
    }
}
