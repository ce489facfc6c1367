//! Scripted and fixed time sources

use async_trait::async_trait;
use curfew_util::Hour;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{TimeError, TimeResult, TimeSource};

/// Always reports the same hour. Used for the development mock hour.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    hour: Hour,
}

impl FixedTimeSource {
    pub fn new(hour: Hour) -> Self {
        Self { hour }
    }
}

#[async_trait]
impl TimeSource for FixedTimeSource {
    async fn fetch_current_hour(&self) -> TimeResult<Hour> {
        Ok(self.hour)
    }

    fn describe(&self) -> String {
        format!("fixed ({})", self.hour)
    }
}

/// Replays queued results in order, for tests.
///
/// Once the script is exhausted every fetch fails with a network error.
#[derive(Debug, Default)]
pub struct ScriptedTimeSource {
    script: Mutex<VecDeque<TimeResult<Hour>>>,
    calls: AtomicUsize,
}

impl ScriptedTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reading. Panics on hours outside 0–23.
    pub fn push_hour(&self, hour: u8) -> &Self {
        match Hour::new(hour) {
            Some(hour) => self.push(Ok(hour)),
            None => panic!("scripted hour out of range: {}", hour),
        }
    }

    pub fn push_error(&self, error: TimeError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, result: TimeResult<Hour>) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
        self
    }

    /// Number of fetches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl TimeSource for ScriptedTimeSource {
    async fn fetch_current_hour(&self) -> TimeResult<Hour> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TimeError::network("script exhausted")))
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replays_in_order() {
        let source = ScriptedTimeSource::new();
        source
            .push_hour(22)
            .push_error(TimeError::validation("bad body"))
            .push_hour(23);

        assert_eq!(source.fetch_current_hour().await.unwrap().value(), 22);
        assert!(matches!(
            source.fetch_current_hour().await,
            Err(TimeError::Validation(_))
        ));
        assert_eq!(source.fetch_current_hour().await.unwrap().value(), 23);
        assert!(matches!(
            source.fetch_current_hour().await,
            Err(TimeError::Network(_))
        ));
        assert_eq!(source.calls(), 4);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn fixed_always_reports_same_hour() {
        let source = FixedTimeSource::new(Hour::new(3).unwrap());
        for _ in 0..3 {
            assert_eq!(source.fetch_current_hour().await.unwrap().value(), 3);
        }
        assert_eq!(source.describe(), "fixed (03:00)");
    }
}
