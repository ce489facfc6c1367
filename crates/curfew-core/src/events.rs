//! Core events emitted by the controller

use curfew_api::SessionCloseReason;
use curfew_time::TimeError;

use crate::{ActiveSession, Presentation};

/// Events emitted by the session controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The presentation state changed
    StateChanged { from: Presentation, to: Presentation },

    /// A destination was opened on the browser surface
    SessionOpened { session: ActiveSession },

    /// The hosted session ended
    SessionClosed {
        session: ActiveSession,
        reason: SessionCloseReason,
    },

    /// A time fetch failed; the state already reflects the failure
    TimeFetchFailed { error: TimeError },
}
