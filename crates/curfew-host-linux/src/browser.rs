//! Headless browser surface

use curfew_host_api::{BrowserSurface, HostResult, LoadRequest};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Browser surface that logs navigation and remembers the last load.
///
/// Used when the page itself is rendered by a separate front-end process,
/// which also owns in-page history. Back and forward are forwarded there,
/// so this surface only records that they were asked for.
#[derive(Debug, Default)]
pub struct LoggingBrowser {
    loaded: Mutex<Option<String>>,
}

impl LoggingBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the last destination loaded, if any
    pub fn current(&self) -> Option<String> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BrowserSurface for LoggingBrowser {
    fn load(&self, request: &LoadRequest) -> HostResult<()> {
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(request.address.clone());

        info!(
            address = %request.address,
            user_agent = ?request.user_agent,
            fullscreen_video = request.allow_fullscreen_video,
            media_capture = request.grant_media_capture,
            "Loading destination"
        );
        Ok(())
    }

    fn go_back(&self) -> HostResult<()> {
        info!(loaded = ?self.current(), "Navigate back");
        Ok(())
    }

    fn go_forward(&self) -> HostResult<()> {
        info!(loaded = ?self.current(), "Navigate forward");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_loaded_initially() {
        let browser = LoggingBrowser::new();
        assert!(browser.current().is_none());
        browser.go_back().unwrap();
        browser.go_forward().unwrap();
        assert!(browser.current().is_none());
    }

    #[test]
    fn load_replaces_current_address() {
        let browser = LoggingBrowser::new();
        browser.load(&LoadRequest::new("https://instagram.com")).unwrap();
        assert_eq!(browser.current().as_deref(), Some("https://instagram.com"));

        browser.load(&LoadRequest::new("https://www.duolingo.com")).unwrap();
        assert_eq!(browser.current().as_deref(), Some("https://www.duolingo.com"));
    }

    #[test]
    fn back_and_forward_keep_loaded_address() {
        let browser = LoggingBrowser::new();
        browser.load(&LoadRequest::new("https://www.linkedin.com")).unwrap();

        browser.go_back().unwrap();
        browser.go_forward().unwrap();
        assert_eq!(browser.current().as_deref(), Some("https://www.linkedin.com"));
    }
}
