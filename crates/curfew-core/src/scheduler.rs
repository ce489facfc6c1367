//! Fetch serialization and retry backoff

use curfew_config::RetryPolicy;
use std::time::Duration;
use tracing::debug;

/// What asked for a time fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Startup,
    Tick,
    Retry,
    Manual,
}

impl FetchTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchTrigger::Startup => "startup",
            FetchTrigger::Tick => "tick",
            FetchTrigger::Retry => "retry",
            FetchTrigger::Manual => "manual",
        }
    }
}

/// Tracks the in-flight fetch and consecutive failures.
///
/// At most one fetch runs at a time; triggers that arrive meanwhile are dropped.
#[derive(Debug, Clone)]
pub struct FetchScheduler {
    retry: RetryPolicy,
    in_flight: Option<FetchTrigger>,
    consecutive_failures: u32,
}

impl FetchScheduler {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            retry,
            in_flight: None,
            consecutive_failures: 0,
        }
    }

    /// Claim the fetch slot. Returns false if a fetch is already running.
    pub fn try_begin(&mut self, trigger: FetchTrigger) -> bool {
        if let Some(running) = self.in_flight {
            debug!(
                trigger = trigger.as_str(),
                running = running.as_str(),
                "Fetch already in flight, trigger dropped"
            );
            return false;
        }

        self.in_flight = Some(trigger);
        true
    }

    /// Release the slot. Returns the delay before a retry, if one should be scheduled.
    pub fn complete(&mut self, succeeded: bool) -> Option<Duration> {
        self.in_flight = None;

        if succeeded {
            self.consecutive_failures = 0;
            return None;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.retry.delay_for(self.consecutive_failures)
    }

    pub fn in_flight(&self) -> Option<FetchTrigger> {
        self.in_flight
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> RetryPolicy {
        RetryPolicy::Backoff {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(30),
        }
    }

    #[test]
    fn second_trigger_dropped_while_in_flight() {
        let mut scheduler = FetchScheduler::new(backoff());
        assert!(scheduler.try_begin(FetchTrigger::Startup));
        assert!(!scheduler.try_begin(FetchTrigger::Tick));
        assert_eq!(scheduler.in_flight(), Some(FetchTrigger::Startup));

        scheduler.complete(true);
        assert!(scheduler.try_begin(FetchTrigger::Tick));
    }

    #[test]
    fn failures_back_off_until_success() {
        let mut scheduler = FetchScheduler::new(backoff());

        let delays: Vec<_> = (0..4)
            .map(|_| {
                scheduler.try_begin(FetchTrigger::Retry);
                scheduler.complete(false)
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_secs(5)),
                Some(Duration::from_secs(10)),
                Some(Duration::from_secs(20)),
                Some(Duration::from_secs(30)),
            ]
        );
        assert_eq!(scheduler.consecutive_failures(), 4);

        scheduler.try_begin(FetchTrigger::Tick);
        assert_eq!(scheduler.complete(true), None);
        assert_eq!(scheduler.consecutive_failures(), 0);

        scheduler.try_begin(FetchTrigger::Tick);
        assert_eq!(scheduler.complete(false), Some(Duration::from_secs(5)));
    }

    #[test]
    fn disabled_retry_never_schedules() {
        let mut scheduler = FetchScheduler::new(RetryPolicy::disabled());
        scheduler.try_begin(FetchTrigger::Startup);
        assert_eq!(scheduler.complete(false), None);
        assert_eq!(scheduler.consecutive_failures(), 1);
        assert!(scheduler.in_flight().is_none());
    }
}
