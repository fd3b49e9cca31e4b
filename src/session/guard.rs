use crate::session::traits::{BrowserSession, NavigationOutcome};
use crate::state::SessionState;
use crate::{CaptureError, NavigationError};
use std::time::Duration;
use tokio::runtime::Handle;
use url::Url;

/// Scoped owner of a browser session
///
/// Two cleanup paths guarantee the browser process is released:
///
/// 1. `release()` - explicit async close on normal paths
/// 2. Drop fallback - spawns the close on the runtime for early returns,
///    panics, and cancelled crawl futures
///
/// Close failures are logged at warn level and never returned.
pub struct SessionGuard<S: BrowserSession + 'static> {
    session: Option<S>,
    label: String,
    runtime: Option<Handle>,
}

impl<S: BrowserSession + 'static> SessionGuard<S> {
    /// Wraps an open session; `label` identifies it in logs
    pub fn new(session: S, label: impl Into<String>) -> Self {
        Self {
            session: Some(session),
            label: label.into(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Current state of the wrapped session (`Closed` once released)
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Closed, |s| s.state())
    }

    pub async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, NavigationError> {
        match self.session.as_mut() {
            Some(session) => session.navigate(url, timeout).await,
            None => Err(NavigationError::InvalidTransition {
                from: SessionState::Closed,
                to: SessionState::Navigating,
            }),
        }
    }

    pub async fn capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        match self.session.as_mut() {
            Some(session) => session.capture().await,
            None => Err(CaptureError::InvalidTransition {
                from: SessionState::Closed,
                to: SessionState::Capturing,
            }),
        }
    }

    /// Closes the session, logging any failure
    pub async fn release(mut self) {
        if let Some(mut session) = self.session.take() {
            close_logged(&mut session, &self.label).await;
        }
    }
}

impl<S: BrowserSession + 'static> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.state() == SessionState::Closed {
            return;
        }

        let label = std::mem::take(&mut self.label);
        match &self.runtime {
            Some(runtime) => {
                tracing::debug!("Session for {} dropped unreleased, closing in background", label);
                runtime.spawn(async move {
                    close_logged(&mut session, &label).await;
                });
            }
            None => {
                tracing::warn!(
                    "Session for {} dropped outside a runtime; browser left to process cleanup",
                    label
                );
            }
        }
    }
}

async fn close_logged<S: BrowserSession>(session: &mut S, label: &str) {
    match session.close().await {
        Ok(()) => tracing::trace!("Browser session for {} closed", label),
        Err(e) => tracing::warn!("Failed to release browser session for {}: {}", label, e),
    }
}
