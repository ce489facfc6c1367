//! Periodic re-evaluation ticks

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// Source of periodic re-evaluation ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    async fn tick(&mut self);
}

/// Production ticker backed by a tokio interval.
///
/// The first tick fires one full period after creation, since the startup
/// fetch already covers time zero. Missed ticks are skipped, not bunched.
pub struct IntervalTicker {
    interval: Interval,
}

/// Longest supported tick period (one day)
pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

impl IntervalTicker {
    /// The period is clamped to `1ms..=MAX_TICK_PERIOD`.
    pub fn new(period: Duration) -> Self {
        let period = period.clamp(MIN_TICK_PERIOD, MAX_TICK_PERIOD);
        let now = tokio::time::Instant::now();
        let start = now.checked_add(period).unwrap_or(now);
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker driven by hand from tests
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Fires ticks on the paired `ManualTicker`
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl TickHandle {
    /// Queue one tick. Returns false once the ticker is gone.
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

pub fn manual_ticker() -> (ManualTicker, TickHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTicker { rx }, TickHandle { tx })
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            // Every handle dropped: no more ticks, ever
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_skips_time_zero() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(300));
        let start = tokio::time::Instant::now();

        ticker.tick().await;
        assert!(start.elapsed() >= Duration::from_secs(300));
        assert_eq!(ticker.period(), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_clamps_period() {
        let ticker = IntervalTicker::new(Duration::from_secs(9_223_372_036_854_775_807));
        assert_eq!(ticker.period(), MAX_TICK_PERIOD);

        let ticker = IntervalTicker::new(Duration::ZERO);
        assert_eq!(ticker.period(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn manual_ticker_delivers_queued_ticks() {
        let (mut ticker, handle) = manual_ticker();
        assert!(handle.tick());
        assert!(handle.tick());

        ticker.tick().await;
        ticker.tick().await;
    }

    #[tokio::test(start_paused = true)]
    async fn manual_ticker_idles_after_handles_drop() {
        let (mut ticker, handle) = manual_ticker();
        drop(handle);

        let result = tokio::time::timeout(Duration::from_secs(1), ticker.tick()).await;
        assert!(result.is_err());
    }
}
