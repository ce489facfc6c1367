//! Host capability traits

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from host capability operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Wake lock unavailable: {0}")]
    WakeLockUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Everything the browser surface needs to open a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub address: String,

    /// User agent override; `None` keeps the engine default
    pub user_agent: Option<String>,

    pub allow_fullscreen_video: bool,

    /// Grant camera/microphone requests without prompting
    pub grant_media_capture: bool,
}

impl LoadRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user_agent: None,
            allow_fullscreen_video: true,
            grant_media_capture: true,
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<impl Into<String>>) -> Self {
        self.user_agent = user_agent.map(Into::into);
        self
    }
}

/// The embedded browser engine.
///
/// All commands are fire-and-forget from the controller's point of view:
/// an `Err` is logged and otherwise ignored.
pub trait BrowserSurface: Send + Sync {
    fn load(&self, request: &LoadRequest) -> HostResult<()>;

    fn go_back(&self) -> HostResult<()>;

    fn go_forward(&self) -> HostResult<()>;
}

/// Keeps the device awake while held. Dropping the guard releases the lock.
#[must_use = "the wake lock is released as soon as the guard is dropped"]
pub struct WakeGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl WakeGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for WakeGuard {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for WakeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeGuard")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// Idle-prevention facility
pub trait WakeLock: Send + Sync {
    fn acquire(&self, reason: &str) -> HostResult<WakeGuard>;
}
