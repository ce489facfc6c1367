//! Error types for curfew

use thiserror::Error;

use crate::DestinationId;

/// Core error type for curfew operations
#[derive(Debug, Error)]
pub enum CurfewError {
    #[error("Destination not found: {0}")]
    DestinationNotFound(DestinationId),

    #[error("Destinations can only be opened from the picker (current state: {0})")]
    NotInPicker(&'static str),

    #[error("No active session")]
    NoActiveSession,
}

pub type Result<T> = std::result::Result<T, CurfewError>;
