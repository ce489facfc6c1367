//! Shared types for the curfew API

use curfew_util::{DestinationId, Hour, SessionId};
use serde::{Deserialize, Serialize};

/// Text shown while browsing is blocked
pub const CURFEW_MESSAGE: &str = "It is time to rest a little bit";

/// View of a destination for the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationView {
    pub id: DestinationId,
    pub label: String,
    pub address: String,
}

/// Why the curfew screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurfewReason {
    /// The current hour falls in the nightly window
    Hour { hour: Hour },
    /// No authoritative hour is known, so access fails closed
    TimeUnavailable,
}

/// The one screen the front-end should be showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Curfew {
        reason: CurfewReason,
        message: String,
    },
    Picker,
    Session {
        session_id: SessionId,
        destination: DestinationView,
    },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Curfew { .. } => "curfew",
            ViewState::Picker => "picker",
            ViewState::Session { .. } => "session",
        }
    }
}

/// Full state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub api_version: u32,
    pub view: ViewState,
    pub current_hour: Option<Hour>,
    /// Catalog in presentation order (always listed, selectable only in the picker)
    pub destinations: Vec<DestinationView>,
}

/// Why a hosted session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCloseReason {
    /// The user pressed reset
    Reset,
    /// The curfew started (or the hour became unknown) while browsing
    Curfew,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_is_tagged() {
        let view = ViewState::Curfew {
            reason: CurfewReason::Hour {
                hour: Hour::new(23).unwrap(),
            },
            message: CURFEW_MESSAGE.into(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "curfew");
        assert_eq!(json["reason"]["kind"], "hour");
        assert_eq!(json["reason"]["hour"], 23);
        assert_eq!(view.name(), "curfew");
    }

    #[test]
    fn time_unavailable_reason() {
        let json = serde_json::to_value(CurfewReason::TimeUnavailable).unwrap();
        assert_eq!(json["kind"], "time_unavailable");
    }
}
