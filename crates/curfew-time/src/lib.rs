//! Authoritative time source for curfew
//!
//! The curfew is evaluated against the hour reported by a remote time
//! service rather than the device clock. This crate provides:
//! - The `TimeSource` trait and its error taxonomy
//! - Validation of the remote response shape (`TimeReading`)
//! - An HTTP implementation backed by reqwest
//! - Scripted and fixed sources for tests and development

mod http;
mod mock;
mod reading;
mod source;

pub use http::*;
pub use mock::*;
pub use reading::*;
pub use source::*;
