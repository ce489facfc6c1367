//! Linux host adapter for curfew
//!
//! Provides:
//! - A headless browser surface that logs every navigation (for kiosks
//!   where the page is rendered elsewhere)
//! - A wake lock backed by a `systemd-inhibit` child process

mod browser;
mod inhibit;

pub use browser::*;
pub use inhibit::*;
