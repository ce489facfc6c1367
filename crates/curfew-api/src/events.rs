//! Event types for service -> front-end streaming

use chrono::{DateTime, Local};
use curfew_util::{DestinationId, SessionId};
use serde::{Deserialize, Serialize};

use crate::{DestinationView, Response, SessionCloseReason, StateSnapshot, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: Local::now(),
            payload,
        }
    }
}

/// All possible events from the service to the front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// The screen to show changed
    StateChanged(StateSnapshot),

    /// A destination was opened
    SessionOpened {
        session_id: SessionId,
        destination: DestinationView,
    },

    /// The hosted session ended
    SessionClosed {
        session_id: SessionId,
        destination_id: DestinationId,
        reason: SessionCloseReason,
    },

    /// A time fetch failed; `kind` is "network" or "validation"
    TimeFetchFailed { kind: String, message: String },

    /// Service is shutting down
    Shutdown,
}

/// One outbound NDJSON line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum ServerMessage {
    Response(Response),
    Event(Event),
}
