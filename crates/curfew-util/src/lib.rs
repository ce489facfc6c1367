//! Shared utilities for curfew
//!
//! This crate provides:
//! - ID types (DestinationId, SessionId)
//! - The `Hour` type and wall-clock helpers
//! - Error types
//! - Default paths for the config file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
