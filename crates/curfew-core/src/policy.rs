//! Nightly curfew window

use curfew_util::Hour;

/// First blocked hour (inclusive)
pub const CURFEW_START_HOUR: u8 = 23;

/// Last blocked hour (inclusive)
pub const CURFEW_END_HOUR: u8 = 5;

/// Whether browsing is blocked at `hour`.
///
/// The window spans midnight: 23:00 through 05:59.
pub fn is_blocked(hour: Hour) -> bool {
    let hour = hour.value();
    hour >= CURFEW_START_HOUR || hour <= CURFEW_END_HOUR
}
