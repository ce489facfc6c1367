//! Curfew policy and session state machine
//!
//! This crate is the heart of curfew, containing:
//! - The nightly curfew window (what hours block browsing)
//! - The static destination catalog
//! - The session state reducer (Loading -> Curfew | Picker -> Session)
//! - The controller that applies time readings and user commands
//! - Fetch scheduling, ticking and the async driver loop

mod catalog;
mod controller;
mod driver;
mod events;
mod policy;
mod scheduler;
mod state;
mod ticker;

pub use catalog::*;
pub use controller::*;
pub use driver::*;
pub use events::*;
pub use policy::*;
pub use scheduler::*;
pub use state::*;
pub use ticker::*;
