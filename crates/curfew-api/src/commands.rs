//! Command types for the curfew protocol

use serde::{Deserialize, Serialize};

use crate::{StateSnapshot, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            command,
        }
    }
}

/// All commands the front-end can send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Open a destination, by id or label (picker only)
    Select { destination: String },

    /// Navigate back in the hosted session
    Back,

    /// Navigate forward in the hosted session
    Forward,

    /// Close the hosted session and return to the picker
    Reset,

    /// Get a full state snapshot
    Status,

    /// Fetch the time now instead of waiting for the next tick
    Refresh,
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub request_id: u64,
    pub api_version: u32,
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.result, ResponseResult::Ok(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Successful response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    State(StateSnapshot),
    Navigated,
    RefreshRequested {
        /// False when a fetch was already in flight
        started: bool,
    },
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    DestinationNotFound,
    NotInPicker,
    NoActiveSession,
}
