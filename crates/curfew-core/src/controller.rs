//! Session controller

use curfew_api::{API_VERSION, SessionCloseReason, StateSnapshot};
use curfew_config::FetchFailurePolicy;
use curfew_host_api::BrowserSurface;
use curfew_time::TimeResult;
use curfew_util::{CurfewError, DestinationId, Hour, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{ActiveSession, CoreEvent, DestinationCatalog, Presentation, SessionState, Transition};

/// Owns the session state and applies time readings and user commands to it
pub struct SessionController {
    state: SessionState,
    catalog: DestinationCatalog,
    browser: Arc<dyn BrowserSurface>,
    on_fetch_failure: FetchFailurePolicy,
}

impl SessionController {
    pub fn new(
        catalog: DestinationCatalog,
        browser: Arc<dyn BrowserSurface>,
        on_fetch_failure: FetchFailurePolicy,
    ) -> Self {
        info!(
            destination_count = catalog.len(),
            on_fetch_failure = ?on_fetch_failure,
            "Session controller initialized"
        );

        Self {
            state: SessionState::initial(),
            catalog,
            browser,
            on_fetch_failure,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn presentation(&self) -> Presentation {
        self.state.presentation()
    }

    pub fn catalog(&self) -> &DestinationCatalog {
        &self.catalog
    }

    pub fn current_session(&self) -> Option<&ActiveSession> {
        self.state.active.as_ref()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            api_version: API_VERSION,
            view: self.presentation().to_view(),
            current_hour: self.state.current_hour,
            destinations: self.catalog.views(),
        }
    }

    /// Apply the outcome of a time fetch. Errors stop here.
    pub fn on_time_fetched(&mut self, result: TimeResult<Hour>) -> Vec<CoreEvent> {
        let before = self.presentation();
        let mut events = Vec::new();

        match result {
            Ok(hour) => {
                debug!(hour = %hour, "Time fetched");
                self.apply(Transition::SetHour(Some(hour)));
            }
            Err(error) => {
                warn!(kind = error.kind(), error = %error, "Time fetch failed");
                if self.on_fetch_failure == FetchFailurePolicy::Clear {
                    self.apply(Transition::SetHour(None));
                }
                events.push(CoreEvent::TimeFetchFailed { error });
            }
        }
        self.apply(Transition::SetLoading(false));

        self.close_session_if_blocked(&mut events);
        self.push_state_change(before, &mut events);
        events
    }

    /// Open a destination by id or label. Only allowed from the picker.
    pub fn select(&mut self, query: &str) -> Result<Vec<CoreEvent>> {
        let before = self.presentation();
        if before != Presentation::Picker {
            debug!(query, state = before.name(), "Selection rejected");
            return Err(CurfewError::NotInPicker(before.name()));
        }

        let destination = *self
            .catalog
            .resolve(query)
            .ok_or_else(|| CurfewError::DestinationNotFound(DestinationId::new(query)))?;

        let session = ActiveSession::new(destination);
        self.apply(Transition::SetDestination(Some(session.clone())));

        info!(
            session_id = %session.session_id,
            destination = destination.id,
            address = destination.address,
            "Session opened"
        );

        if let Err(e) = self.browser.load(&destination.load_request()) {
            warn!(error = %e, address = destination.address, "Browser load failed");
        }

        let mut events = vec![CoreEvent::SessionOpened { session }];
        self.push_state_change(before, &mut events);
        Ok(events)
    }

    /// Close the hosted session and return to the picker. No-op outside a session.
    pub fn reset(&mut self) -> Vec<CoreEvent> {
        let before = self.presentation();
        let Some(session) = self.state.active.clone() else {
            debug!(state = before.name(), "Reset without active session ignored");
            return Vec::new();
        };

        self.apply(Transition::SetDestination(None));

        info!(
            session_id = %session.session_id,
            destination = session.destination.id,
            "Session reset"
        );

        let mut events = vec![CoreEvent::SessionClosed {
            session,
            reason: SessionCloseReason::Reset,
        }];
        self.push_state_change(before, &mut events);
        events
    }

    pub fn go_back(&self) -> Result<()> {
        self.require_session()?;
        if let Err(e) = self.browser.go_back() {
            warn!(error = %e, "Browser back failed");
        }
        Ok(())
    }

    pub fn go_forward(&self) -> Result<()> {
        self.require_session()?;
        if let Err(e) = self.browser.go_forward() {
            warn!(error = %e, "Browser forward failed");
        }
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        match self.presentation() {
            Presentation::Session(_) => Ok(()),
            _ => Err(CurfewError::NoActiveSession),
        }
    }

    fn apply(&mut self, transition: Transition) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(transition);
    }

    /// A session never survives into a non-browsable state
    fn close_session_if_blocked(&mut self, events: &mut Vec<CoreEvent>) {
        if self.presentation().is_browsable() {
            return;
        }

        if let Some(session) = self.state.active.clone() {
            self.apply(Transition::SetDestination(None));

            info!(
                session_id = %session.session_id,
                destination = session.destination.id,
                hour = ?self.state.current_hour,
                "Session closed by curfew"
            );

            events.push(CoreEvent::SessionClosed {
                session,
                reason: SessionCloseReason::Curfew,
            });
        }
    }

    fn push_state_change(&self, before: Presentation, events: &mut Vec<CoreEvent>) {
        let after = self.presentation();
        if after != before {
            info!(from = before.name(), to = after.name(), "State changed");
            events.push(CoreEvent::StateChanged {
                from: before,
                to: after,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curfew_api::{CurfewReason, ViewState};
    use curfew_host_api::{BrowserCommand, MockBrowser};
    use curfew_time::TimeError;

    fn setup(policy: FetchFailurePolicy) -> (SessionController, Arc<MockBrowser>) {
        let browser = Arc::new(MockBrowser::new());
        let controller =
            SessionController::new(DestinationCatalog::builtin(), browser.clone(), policy);
        (controller, browser)
    }

    fn hour(h: u8) -> TimeResult<Hour> {
        Ok(Hour::new(h).unwrap())
    }

    fn state_changes(events: &[CoreEvent]) -> Vec<(&'static str, &'static str)> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::StateChanged { from, to } => Some((from.name(), to.name())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_fetch_goes_to_picker() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);
        assert_eq!(controller.presentation(), Presentation::Loading);

        let events = controller.on_time_fetched(hour(10));
        assert_eq!(state_changes(&events), vec![("loading", "picker")]);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.view, ViewState::Picker);
        assert_eq!(snapshot.destinations.len(), 5);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["view"]["state"], "picker");
        assert_eq!(json["current_hour"], 10);
        assert_eq!(json["destinations"][0]["id"], "instagram");
    }

    #[test]
    fn first_fetch_at_night_goes_to_curfew() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);

        let events = controller.on_time_fetched(hour(23));
        assert_eq!(state_changes(&events), vec![("loading", "curfew")]);

        let events = controller.on_time_fetched(hour(6));
        assert_eq!(state_changes(&events), vec![("curfew", "picker")]);
    }

    #[test]
    fn select_and_reset() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(14));

        let events = controller.select("Youtube").unwrap();
        assert!(matches!(events[0], CoreEvent::SessionOpened { .. }));
        assert_eq!(state_changes(&events), vec![("picker", "session")]);
        assert_eq!(
            controller.current_session().map(|s| s.destination.address),
            Some("https://youtube.com.br")
        );
        assert_eq!(browser.last_loaded().as_deref(), Some("https://youtube.com.br"));

        let events = controller.reset();
        assert!(matches!(
            events[0],
            CoreEvent::SessionClosed {
                reason: SessionCloseReason::Reset,
                ..
            }
        ));
        assert_eq!(controller.presentation(), Presentation::Picker);
        assert!(controller.current_session().is_none());
    }

    #[test]
    fn select_rejected_outside_picker() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);

        assert!(matches!(
            controller.select("youtube"),
            Err(CurfewError::NotInPicker("loading"))
        ));

        controller.on_time_fetched(hour(2));
        assert!(matches!(
            controller.select("youtube"),
            Err(CurfewError::NotInPicker("curfew"))
        ));

        controller.on_time_fetched(hour(9));
        controller.select("youtube").unwrap();
        assert!(matches!(
            controller.select("instagram"),
            Err(CurfewError::NotInPicker("session"))
        ));

        // Only the one accepted selection reached the browser
        assert_eq!(browser.commands().len(), 1);
    }

    #[test]
    fn select_unknown_destination() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(9));

        let err = controller.select("tiktok").unwrap_err();
        assert!(matches!(err, CurfewError::DestinationNotFound(id) if id.as_str() == "tiktok"));
        assert_eq!(controller.presentation(), Presentation::Picker);
        assert!(browser.commands().is_empty());
    }

    #[test]
    fn reset_in_picker_is_noop() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(9));
        let before = controller.state().clone();

        assert!(controller.reset().is_empty());
        assert_eq!(controller.state(), &before);
        assert!(browser.commands().is_empty());
    }

    #[test]
    fn navigation_forwarded_only_in_session() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(9));

        assert!(matches!(controller.go_back(), Err(CurfewError::NoActiveSession)));

        controller.select("linkedin").unwrap();
        let before = controller.state().clone();
        controller.go_back().unwrap();
        controller.go_forward().unwrap();
        assert_eq!(controller.state(), &before);

        let commands = browser.commands();
        assert_eq!(commands[1..], [BrowserCommand::Back, BrowserCommand::Forward]);
    }

    #[test]
    fn browser_failures_are_not_surfaced() {
        let (mut controller, browser) = setup(FetchFailurePolicy::Clear);
        browser
            .fail_commands
            .store(true, std::sync::atomic::Ordering::SeqCst);
        controller.on_time_fetched(hour(9));

        controller.select("fluency").unwrap();
        assert!(matches!(controller.presentation(), Presentation::Session(_)));
        controller.go_back().unwrap();
    }

    #[test]
    fn curfew_tick_closes_session() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(22));
        controller.select("youtube").unwrap();

        let events = controller.on_time_fetched(hour(23));
        assert!(events.iter().any(|e| matches!(
            e,
            CoreEvent::SessionClosed {
                reason: SessionCloseReason::Curfew,
                ..
            }
        )));
        assert_eq!(state_changes(&events), vec![("session", "curfew")]);
        assert!(controller.current_session().is_none());

        // Re-entering after curfew lands in the picker, not the old destination
        controller.on_time_fetched(hour(6));
        assert_eq!(controller.presentation(), Presentation::Picker);
    }

    #[test]
    fn open_tick_keeps_session() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(20));
        controller.select("youtube").unwrap();

        let events = controller.on_time_fetched(hour(21));
        assert!(events.is_empty());
        assert!(matches!(controller.presentation(), Presentation::Session(_)));
    }

    #[test]
    fn first_fetch_failure_fails_closed() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);

        let events =
            controller.on_time_fetched(Err(TimeError::validation("missing field `datetime`")));

        assert!(!controller.state().loading);
        assert!(controller.state().current_hour.is_none());
        assert_eq!(
            controller.presentation(),
            Presentation::Curfew(CurfewReason::TimeUnavailable)
        );
        assert!(matches!(events[0], CoreEvent::TimeFetchFailed { .. }));
        assert_eq!(state_changes(&events), vec![("loading", "curfew")]);
    }

    #[test]
    fn failure_clears_hour_and_session() {
        let (mut controller, _) = setup(FetchFailurePolicy::Clear);
        controller.on_time_fetched(hour(12));
        controller.select("duolingo").unwrap();

        let events = controller.on_time_fetched(Err(TimeError::network("timeout")));
        assert!(controller.state().current_hour.is_none());
        assert!(controller.current_session().is_none());
        assert_eq!(state_changes(&events), vec![("session", "curfew")]);
    }

    #[test]
    fn failure_retains_last_known_hour() {
        let (mut controller, _) = setup(FetchFailurePolicy::RetainLastKnown);
        controller.on_time_fetched(hour(12));
        controller.select("duolingo").unwrap();

        let events = controller.on_time_fetched(Err(TimeError::network("timeout")));
        assert_eq!(controller.state().current_hour, Hour::new(12));
        assert!(matches!(controller.presentation(), Presentation::Session(_)));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn retain_without_known_hour_still_fails_closed() {
        let (mut controller, _) = setup(FetchFailurePolicy::RetainLastKnown);
        controller.on_time_fetched(Err(TimeError::network("offline")));
        assert_eq!(
            controller.presentation(),
            Presentation::Curfew(CurfewReason::TimeUnavailable)
        );
    }

    #[test]
    fn presentation_depends_only_on_latest_hour() {
        let histories: [&[u8]; 3] = [&[10], &[2, 23, 10], &[22, 5, 6, 10]];

        let mut views = Vec::new();
        for history in histories {
            let (mut controller, _) = setup(FetchFailurePolicy::Clear);
            for h in history {
                controller.on_time_fetched(hour(*h));
            }
            views.push(controller.snapshot().view);
        }

        assert!(views.iter().all(|v| *v == ViewState::Picker));
    }
}
