//! Session state record and reducer

use curfew_api::{CURFEW_MESSAGE, CurfewReason, ViewState};
use curfew_util::{Hour, SessionId};

use crate::{Destination, is_blocked};

/// One hosted browsing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session_id: SessionId,
    pub destination: Destination,
}

impl ActiveSession {
    pub fn new(destination: Destination) -> Self {
        Self {
            session_id: SessionId::new(),
            destination,
        }
    }
}

/// The single mutable record owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// True until the first fetch resolves, successfully or not
    pub loading: bool,
    pub current_hour: Option<Hour>,
    pub active: Option<ActiveSession>,
}

/// The only ways `SessionState` changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SetHour(Option<Hour>),
    SetLoading(bool),
    SetDestination(Option<ActiveSession>),
}

impl SessionState {
    pub fn initial() -> Self {
        Self {
            loading: true,
            current_hour: None,
            active: None,
        }
    }

    /// Pure reducer: `state × transition → state`
    pub fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::SetHour(current_hour) => Self {
                current_hour,
                ..self
            },
            Transition::SetLoading(loading) => Self { loading, ..self },
            Transition::SetDestination(active) => Self { active, ..self },
        }
    }

    /// Derive the screen to present.
    ///
    /// An unknown hour after loading has finished is treated as curfew.
    pub fn presentation(&self) -> Presentation {
        if self.loading {
            return Presentation::Loading;
        }

        match self.current_hour {
            None => Presentation::Curfew(CurfewReason::TimeUnavailable),
            Some(hour) if is_blocked(hour) => Presentation::Curfew(CurfewReason::Hour { hour }),
            Some(_) => match &self.active {
                None => Presentation::Picker,
                Some(session) => Presentation::Session(session.clone()),
            },
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Mutually exclusive presentation states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Loading,
    Curfew(CurfewReason),
    Picker,
    Session(ActiveSession),
}

impl Presentation {
    pub fn name(&self) -> &'static str {
        match self {
            Presentation::Loading => "loading",
            Presentation::Curfew(_) => "curfew",
            Presentation::Picker => "picker",
            Presentation::Session(_) => "session",
        }
    }

    /// Whether a destination may be hosted in this state
    pub fn is_browsable(&self) -> bool {
        matches!(self, Presentation::Picker | Presentation::Session(_))
    }

    pub fn to_view(&self) -> ViewState {
        match self {
            Presentation::Loading => ViewState::Loading,
            Presentation::Curfew(reason) => ViewState::Curfew {
                reason: *reason,
                message: CURFEW_MESSAGE.to_string(),
            },
            Presentation::Picker => ViewState::Picker,
            Presentation::Session(session) => ViewState::Session {
                session_id: session.session_id.clone(),
                destination: session.destination.to_view(),
            },
        }
    }
}
