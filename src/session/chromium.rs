//! Headless Chromium session over the DevTools protocol

use crate::config::{BrowserConfig, Config, TimeoutConfig};
use crate::session::parser::parse_page;
use crate::session::traits::{BrowserSession, NavigationOutcome, SessionLauncher};
use crate::state::SessionState;
use crate::{CaptureError, LaunchError, NavigationError, ReleaseError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// HTTP status of the main document, from the Navigation Timing entry.
/// Evaluates to 0 when the browser does not expose it.
const RESPONSE_STATUS_JS: &str =
    "(() => { const e = performance.getEntriesByType('navigation')[0]; return e && e.responseStatus ? e.responseStatus : 0; })()";

/// Launches one Chromium process per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    browser: BrowserConfig,
    timeouts: TimeoutConfig,
}

impl ChromiumLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            browser: config.browser.clone(),
            timeouts: config.timeouts.clone(),
        }
    }

    fn cdp_config(&self, profile: &TempDir) -> Result<CdpBrowserConfig, LaunchError> {
        let mut builder = CdpBrowserConfig::builder()
            .user_data_dir(profile.path())
            .window_size(self.browser.window_width, self.browser.window_height)
            .viewport(None)
            .launch_timeout(self.timeouts.launch())
            .request_timeout(self.timeouts.navigation())
            .arg(format!("--user-agent={}", self.browser.user_agent))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");

        if !self.browser.headless {
            builder = builder.with_head();
        }
        if !self.browser.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &self.browser.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(LaunchError::Config)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn open(&self) -> Result<ChromiumSession, LaunchError> {
        let mut state = SessionState::Closed;
        enter(&mut state, SessionState::Launching)?;

        let launch_timeout = self.timeouts.launch();
        let profile = tempfile::Builder::new()
            .prefix("site-snapshot-profile-")
            .tempdir()?;
        let cdp_config = self.cdp_config(&profile)?;

        tracing::debug!("Launching browser with profile {}", profile.path().display());

        let (browser, mut handler) = tokio::time::timeout(launch_timeout, Browser::launch(cdp_config))
            .await
            .map_err(|_| LaunchError::Timeout(launch_timeout))?
            .map_err(|e| LaunchError::Browser(e.to_string()))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        // Browser's own Drop kills the process if we bail out below
        let page = match tokio::time::timeout(launch_timeout, browser.new_page("about:blank")).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                handler_task.abort();
                return Err(LaunchError::Browser(format!("Failed to open page: {}", e)));
            }
            Err(_) => {
                handler_task.abort();
                return Err(LaunchError::Timeout(launch_timeout));
            }
        };

        enter(&mut state, SessionState::Open)?;
        tracing::debug!("Browser session open");

        Ok(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            profile: Some(profile),
            state,
            settle: self.timeouts.settle(),
            capture_timeout: self.timeouts.capture(),
            close_timeout: self.timeouts.close(),
        })
    }
}

fn enter(state: &mut SessionState, next: SessionState) -> Result<(), LaunchError> {
    let from = state
        .advance(next)
        .map_err(|from| LaunchError::InvalidTransition { from, to: next })?;
    tracing::trace!("Session state {} -> {}", from, next);
    Ok(())
}

/// A running Chromium process with one page
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    profile: Option<TempDir>,
    state: SessionState,
    settle: Duration,
    capture_timeout: Duration,
    close_timeout: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    async fn load(&self, url: &Url, timeout: Duration) -> Result<NavigationOutcome, NavigationError> {
        let target = url.as_str();
        let page = self.page().ok_or_else(|| NavigationError::Browser {
            url: target.to_string(),
            message: "page already closed".to_string(),
        })?;

        let browser_error = |e: chromiumoxide::error::CdpError| NavigationError::Browser {
            url: target.to_string(),
            message: e.to_string(),
        };
        let timed_out = || NavigationError::Timeout {
            url: target.to_string(),
            after: timeout,
        };

        // chromiumoxide resolves Page.navigate once the frame's load event has
        // fired, so the timeout bounds the full load rather than DOMContentLoaded
        tokio::time::timeout(timeout, async {
            let response = page
                .execute(NavigateParams::new(target))
                .await
                .map_err(browser_error)?;
            if let Some(error_text) = &response.result.error_text {
                return Err(NavigationError::from_chrome_error(target, error_text, timeout));
            }
            page.wait_for_navigation().await.map_err(browser_error)?;
            Ok::<(), NavigationError>(())
        })
        .await
        .map_err(|_| timed_out())??;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let status = response_status(page).await;
        if status >= 400 {
            return Err(NavigationError::Http {
                url: target.to_string(),
                status,
            });
        }

        let (final_url, html, title) = tokio::time::timeout(timeout, async {
            let final_url = page.url().await.map_err(browser_error)?;
            let html = page.content().await.map_err(browser_error)?;
            let title = page.get_title().await.map_err(browser_error)?;
            Ok::<_, NavigationError>((final_url, html, title))
        })
        .await
        .map_err(|_| timed_out())??;

        let parsed = parse_page(&html);
        let page_title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or(parsed.title)
            .unwrap_or_default();

        Ok(NavigationOutcome {
            final_url: final_url.unwrap_or_else(|| target.to_string()),
            page_title,
            raw_links: parsed.raw_links,
        })
    }

    async fn screenshot(&self) -> Result<Vec<u8>, CaptureError> {
        let page = self
            .page()
            .ok_or_else(|| CaptureError::Browser("page already closed".to_string()))?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let bytes = tokio::time::timeout(self.capture_timeout, page.screenshot(params))
            .await
            .map_err(|_| CaptureError::Timeout(self.capture_timeout))?
            .map_err(|e| CaptureError::Browser(e.to_string()))?;

        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        Ok(bytes)
    }

    async fn shutdown(&mut self) -> Result<(), ReleaseError> {
        let mut first_error = None;

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                first_error = Some(ReleaseError::Page(e.to_string()));
            }
        }

        if let Some(browser) = self.browser.as_mut() {
            if let Err(e) = browser.close().await {
                first_error.get_or_insert(ReleaseError::Browser(e.to_string()));
            }
            if let Err(e) = browser.wait().await {
                first_error.get_or_insert(ReleaseError::Browser(e.to_string()));
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn abort_handler(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// Reads the main document's HTTP status; 0 when unavailable
async fn response_status(page: &Page) -> u16 {
    match page.evaluate(RESPONSE_STATUS_JS).await {
        Ok(result) => result
            .into_value::<f64>()
            .map(|status| status as u16)
            .unwrap_or(0),
        Err(e) => {
            tracing::debug!("Could not read response status: {}", e);
            0
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.state
            .advance(SessionState::Navigating)
            .map_err(|from| NavigationError::InvalidTransition {
                from,
                to: SessionState::Navigating,
            })?;

        tracing::debug!("Navigating to {}", url);
        let result = self.load(url, timeout).await;

        self.state = match &result {
            Ok(_) => SessionState::Navigated,
            Err(_) => SessionState::NavigationFailed,
        };
        result
    }

    async fn capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.state
            .advance(SessionState::Capturing)
            .map_err(|from| CaptureError::InvalidTransition {
                from,
                to: SessionState::Capturing,
            })?;

        let result = self.screenshot().await;

        self.state = match &result {
            Ok(_) => SessionState::Captured,
            Err(_) => SessionState::CaptureFailed,
        };
        result
    }

    async fn close(&mut self) -> Result<(), ReleaseError> {
        if self.state.advance(SessionState::Closing).is_err() {
            return Ok(());
        }

        let close_timeout = self.close_timeout;
        let result = match tokio::time::timeout(close_timeout, self.shutdown()).await {
            Ok(result) => result,
            Err(_) => Err(ReleaseError::Timeout(close_timeout)),
        };

        // Dropping the browser kills the process if it is still running
        self.page = None;
        self.browser = None;
        self.abort_handler();
        self.profile = None;
        self.state = SessionState::Closed;

        result
    }

    fn state(&self) -> SessionState {
        self.state
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.abort_handler();
    }
}
