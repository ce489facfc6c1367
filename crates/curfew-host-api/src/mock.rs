//! Mock host capabilities for testing

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{BrowserSurface, HostError, HostResult, LoadRequest, WakeGuard, WakeLock};

/// A command received by the mock browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    Load(LoadRequest),
    Back,
    Forward,
}

/// Browser surface that records every command it receives
#[derive(Debug, Default)]
pub struct MockBrowser {
    commands: Mutex<Vec<BrowserCommand>>,

    /// Configure every command to fail (after being recorded)
    pub fail_commands: AtomicBool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<BrowserCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Address of the most recent load, if any
    pub fn last_loaded(&self) -> Option<String> {
        self.commands().into_iter().rev().find_map(|c| match c {
            BrowserCommand::Load(request) => Some(request.address),
            _ => None,
        })
    }

    fn record(&self, command: BrowserCommand) -> HostResult<()> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);

        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(HostError::NavigationFailed("Mock navigation failure".into()));
        }
        Ok(())
    }
}

impl BrowserSurface for MockBrowser {
    fn load(&self, request: &LoadRequest) -> HostResult<()> {
        self.record(BrowserCommand::Load(request.clone()))
    }

    fn go_back(&self) -> HostResult<()> {
        self.record(BrowserCommand::Back)
    }

    fn go_forward(&self) -> HostResult<()> {
        self.record(BrowserCommand::Forward)
    }
}

/// Wake lock that tracks how many guards are outstanding
#[derive(Debug, Default)]
pub struct MockWakeLock {
    held: Arc<AtomicUsize>,
    acquisitions: AtomicUsize,

    /// Configure acquire to fail
    pub fail_acquire: AtomicBool,
}

impl MockWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guards currently outstanding
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl WakeLock for MockWakeLock {
    fn acquire(&self, _reason: &str) -> HostResult<WakeGuard> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(HostError::WakeLockUnavailable("Mock acquire failure".into()));
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.held.fetch_add(1, Ordering::SeqCst);

        let held = self.held.clone();
        Ok(WakeGuard::new(move || {
            held.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}
