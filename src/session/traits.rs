use crate::state::SessionState;
use crate::{CaptureError, LaunchError, NavigationError, ReleaseError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// What a successful navigation yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// URL after redirects
    pub final_url: String,

    /// `document.title`, or the `<title>` element when that is empty
    pub page_title: String,

    /// Anchor hrefs as written in the markup, deduplicated, in document order
    pub raw_links: Vec<String>,
}

/// Starts browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession + 'static;

    /// Launches an isolated browser process with one blank page
    async fn open(&self) -> Result<Self::Session, LaunchError>;
}

/// One browser process bound to one page
///
/// Every method validates the session state transition it performs; calling
/// a stage out of order returns an `InvalidTransition` error.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url`, waiting at most `timeout` for the document to be parsed
    async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, NavigationError>;

    /// Takes a full-page PNG screenshot of the loaded page
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureError>;

    /// Releases the page and terminates the browser process
    ///
    /// Valid from any state; closing a closed session is a no-op.
    async fn close(&mut self) -> Result<(), ReleaseError>;

    /// Current lifecycle state
    fn state(&self) -> SessionState;
}
