//! Front-end protocol types for curfew
//!
//! The presentation layer talks to the session service with newline
//! delimited JSON. This crate defines:
//! - Commands (requests from the front-end)
//! - Responses
//! - Events (service -> front-end)
//! - State snapshots describing what the front-end should show

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
