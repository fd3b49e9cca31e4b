//! Site-Snapshot: website metadata and visual snapshot extraction
//!
//! Given a candidate tool URL, this crate drives a headless browser session to
//! resolve the page, capture a screenshot, normalize it into a thumbnail, and
//! classify the outbound links found on the page (social profiles, app-store
//! listings, affiliate/referral markers).

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod state;
pub mod thumbnail;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Errors that terminate a crawl attempt
///
/// Only bad input and a browser that cannot be started end a crawl with an
/// error. Every other failure is recorded on the returned result. `Task` is
/// raised by the scheduler when a spawned crawl dies before returning.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid input URL: {0}")]
    InvalidInput(#[from] UrlError),

    #[error("Browser launch failed: {0}")]
    Launch(#[from] LaunchError),

    #[error("Crawl task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Browser process start-up errors
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Invalid browser configuration: {0}")]
    Config(String),

    #[error("Failed to create browser profile directory: {0}")]
    Profile(#[from] std::io::Error),

    #[error("Browser process failed to start: {0}")]
    Browser(String),

    #[error("Browser did not start within {0:?}")]
    Timeout(Duration),

    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },
}

/// Errors raised while loading a page
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("DNS resolution failed for {url}: {message}")]
    Dns { url: String, message: String },

    #[error("TLS failure for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Browser navigation error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },
}

impl NavigationError {
    /// Maps a Chrome network error string (`net::ERR_*`) to a navigation error
    ///
    /// # Arguments
    ///
    /// * `url` - The URL that was being loaded
    /// * `error_text` - The error text reported by the browser
    /// * `timeout` - The navigation timeout, reported for timeout errors
    pub fn from_chrome_error(url: &str, error_text: &str, timeout: Duration) -> Self {
        let url = url.to_string();
        let message = error_text.to_string();

        if error_text.contains("ERR_NAME_NOT_RESOLVED")
            || error_text.contains("ERR_NAME_RESOLUTION_FAILED")
            || error_text.contains("ERR_DNS_")
        {
            Self::Dns { url, message }
        } else if error_text.contains("ERR_CERT_")
            || error_text.contains("ERR_SSL_")
            || error_text.contains("ERR_BAD_SSL_CLIENT_AUTH_CERT")
        {
            Self::Tls { url, message }
        } else if error_text.contains("ERR_TIMED_OUT")
            || error_text.contains("ERR_CONNECTION_TIMED_OUT")
        {
            Self::Timeout {
                url,
                after: timeout,
            }
        } else {
            Self::Browser { url, message }
        }
    }
}

/// Errors raised while taking a screenshot
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Screenshot timed out after {0:?}")]
    Timeout(Duration),

    #[error("Screenshot failed: {0}")]
    Browser(String),

    #[error("Screenshot returned no image data")]
    Empty,

    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },
}

/// Errors raised while releasing a browser session
///
/// These are logged and never surfaced to the caller of a crawl.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Failed to close page: {0}")]
    Page(String),

    #[error("Failed to close browser: {0}")]
    Browser(String),

    #[error("Browser did not exit within {0:?}")]
    Timeout(Duration),
}

/// Image pipeline errors (resize and artifact storage)
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Source image is empty")]
    EmptyInput,

    #[error("Invalid target box {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Image resize task failed: {0}")]
    Task(String),

    #[error("Image storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for image pipeline operations
pub type ImageResult<T> = std::result::Result<T, ImageError>;

// Re-export commonly used types
pub use classifier::{classify, ClassifiedLinks, LinkCategory};
pub use config::Config;
pub use crawler::{crawl, CrawlRequest, CrawlResult, Coordinator, Scheduler, ThumbnailArtifact};
pub use session::{BrowserSession, ChromiumLauncher, NavigationOutcome, SessionLauncher};
pub use state::SessionState;
pub use url::{extract_domain, normalize_request_url};
