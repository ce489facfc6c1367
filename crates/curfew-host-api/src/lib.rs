//! Host capability interfaces for curfew
//!
//! This crate defines the narrow interfaces between the session controller
//! and the platform: the embedded browser surface and the idle-prevention
//! (wake lock) facility. It contains no platform code itself; mocks for
//! tests live alongside the traits.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
