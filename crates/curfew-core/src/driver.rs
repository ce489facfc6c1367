//! Async event loop that owns the session controller
//!
//! The driver is the single owner of the session state. It multiplexes:
//! - periodic ticks from a [`Ticker`]
//! - completed time fetches (run as spawned tasks)
//! - the retry deadline after a failed fetch
//! - front-end requests
//! - the shutdown signal

use curfew_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, Request, Response, ResponsePayload,
    ServerMessage,
};
use curfew_config::RetryPolicy;
use curfew_host_api::{WakeGuard, WakeLock};
use curfew_time::{TimeResult, TimeSource};
use curfew_util::{CurfewError, Hour, format_duration};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{CoreEvent, FetchScheduler, FetchTrigger, SessionController, Ticker};

const WAKE_LOCK_REASON: &str = "Hosting a curfew browsing session";

pub struct SessionDriver<T: Ticker> {
    controller: SessionController,
    scheduler: FetchScheduler,
    time_source: Arc<dyn TimeSource>,
    ticker: T,
    wake_lock: Option<Arc<dyn WakeLock>>,
}

impl<T: Ticker> SessionDriver<T> {
    pub fn new(
        controller: SessionController,
        time_source: Arc<dyn TimeSource>,
        ticker: T,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            controller,
            scheduler: FetchScheduler::new(retry),
            time_source,
            ticker,
            wake_lock: None,
        }
    }

    /// Hold the display awake for as long as the driver runs
    pub fn with_wake_lock(mut self, wake_lock: Arc<dyn WakeLock>) -> Self {
        self.wake_lock = Some(wake_lock);
        self
    }

    /// Run until `shutdown` flips to true (or its sender is dropped).
    ///
    /// Returns the controller so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<Request>,
        outbound: mpsc::UnboundedSender<ServerMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> SessionController {
        let wake_guard = self.acquire_wake_guard();

        let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<TimeResult<Hour>>();
        let mut retry_at: Option<Instant> = None;
        let mut requests_open = true;

        info!(source = %self.time_source.describe(), "Session driver running");

        emit(&outbound, EventPayload::StateChanged(self.controller.snapshot()));
        self.start_fetch(FetchTrigger::Startup, &fetch_tx);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }

                _ = self.ticker.tick() => {
                    debug!("Tick");
                    self.start_fetch(FetchTrigger::Tick, &fetch_tx);
                }

                _ = tokio::time::sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                    retry_at = None;
                    self.start_fetch(FetchTrigger::Retry, &fetch_tx);
                }

                Some(result) = fetch_rx.recv() => {
                    let succeeded = result.is_ok();
                    let events = self.controller.on_time_fetched(result);

                    match self.scheduler.complete(succeeded) {
                        Some(delay) => {
                            retry_at = Instant::now().checked_add(delay);
                            if retry_at.is_some() {
                                info!(
                                    delay = %format_duration(delay),
                                    failures = self.scheduler.consecutive_failures(),
                                    "Time fetch retry scheduled"
                                );
                            } else {
                                warn!(
                                    delay = ?delay,
                                    "Retry delay out of range, waiting for the next tick"
                                );
                            }
                        }
                        None if succeeded => retry_at = None,
                        None => {}
                    }

                    self.publish(events, &outbound);
                }

                request = requests.recv(), if requests_open => {
                    match request {
                        Some(request) => {
                            let (response, events) = self.handle_request(request, &fetch_tx);
                            if outbound.send(ServerMessage::Response(response)).is_err() {
                                debug!("Outbound channel closed, response dropped");
                            }
                            self.publish(events, &outbound);
                        }
                        None => {
                            info!("Front-end request channel closed");
                            requests_open = false;
                        }
                    }
                }
            }
        }

        emit(&outbound, EventPayload::Shutdown);

        // Releasing may wait on a child process
        if let Some(guard) = wake_guard {
            match tokio::task::spawn_blocking(move || guard.release()).await {
                Ok(()) => debug!("Wake lock released"),
                Err(e) => warn!(error = %e, "Wake lock release task failed"),
            }
        }

        info!(
            state = self.controller.presentation().name(),
            "Session driver stopped"
        );
        self.controller
    }

    fn acquire_wake_guard(&self) -> Option<WakeGuard> {
        let lock = self.wake_lock.as_ref()?;
        match lock.acquire(WAKE_LOCK_REASON) {
            Ok(guard) => {
                info!("Wake lock acquired");
                Some(guard)
            }
            Err(e) => {
                warn!(error = %e, "Failed to acquire wake lock, display may sleep");
                None
            }
        }
    }

    /// Spawn a fetch unless one is already running. Returns whether one started.
    fn start_fetch(
        &mut self,
        trigger: FetchTrigger,
        results: &mpsc::UnboundedSender<TimeResult<Hour>>,
    ) -> bool {
        if !self.scheduler.try_begin(trigger) {
            return false;
        }

        debug!(trigger = trigger.as_str(), "Fetching current hour");

        let source = self.time_source.clone();
        let results = results.clone();
        tokio::spawn(async move {
            let result = source.fetch_current_hour().await;
            // Receiver is gone after shutdown
            let _ = results.send(result);
        });
        true
    }

    fn handle_request(
        &mut self,
        request: Request,
        fetch_tx: &mpsc::UnboundedSender<TimeResult<Hour>>,
    ) -> (Response, Vec<CoreEvent>) {
        let request_id = request.request_id;
        debug!(request_id, command = ?request.command, "Handling request");

        let outcome = match request.command {
            Command::Select { destination } => self
                .controller
                .select(&destination)
                .map(|events| (ResponsePayload::State(self.controller.snapshot()), events)),
            Command::Reset => {
                let events = self.controller.reset();
                Ok((ResponsePayload::State(self.controller.snapshot()), events))
            }
            Command::Back => self
                .controller
                .go_back()
                .map(|()| (ResponsePayload::Navigated, Vec::new())),
            Command::Forward => self
                .controller
                .go_forward()
                .map(|()| (ResponsePayload::Navigated, Vec::new())),
            Command::Status => Ok((ResponsePayload::State(self.controller.snapshot()), Vec::new())),
            Command::Refresh => {
                let started = self.start_fetch(FetchTrigger::Manual, fetch_tx);
                Ok((ResponsePayload::RefreshRequested { started }, Vec::new()))
            }
        };

        match outcome {
            Ok((payload, events)) => (Response::success(request_id, payload), events),
            Err(e) => {
                debug!(request_id, error = %e, "Request rejected");
                (Response::error(request_id, error_info(&e)), Vec::new())
            }
        }
    }

    fn publish(&self, events: Vec<CoreEvent>, outbound: &mpsc::UnboundedSender<ServerMessage>) {
        for event in events {
            let payload = match event {
                CoreEvent::StateChanged { .. } => {
                    EventPayload::StateChanged(self.controller.snapshot())
                }
                CoreEvent::SessionOpened { session } => EventPayload::SessionOpened {
                    session_id: session.session_id,
                    destination: session.destination.to_view(),
                },
                CoreEvent::SessionClosed { session, reason } => EventPayload::SessionClosed {
                    session_id: session.session_id,
                    destination_id: session.destination.destination_id(),
                    reason,
                },
                CoreEvent::TimeFetchFailed { error } => EventPayload::TimeFetchFailed {
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                },
            };
            emit(outbound, payload);
        }
    }
}

fn emit(outbound: &mpsc::UnboundedSender<ServerMessage>, payload: EventPayload) {
    if outbound
        .send(ServerMessage::Event(Event::new(payload)))
        .is_err()
    {
        debug!("Outbound channel closed, event dropped");
    }
}

fn error_info(error: &CurfewError) -> ErrorInfo {
    let code = match error {
        CurfewError::DestinationNotFound(_) => ErrorCode::DestinationNotFound,
        CurfewError::NotInPicker(_) => ErrorCode::NotInPicker,
        CurfewError::NoActiveSession => ErrorCode::NoActiveSession,
    };
    ErrorInfo::new(code, error.to_string())
}
