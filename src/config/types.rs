use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome user agent sent with every navigation
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Main configuration structure for Site-Snapshot
///
/// Every section is optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub images: ImageConfig,
    pub crawler: CrawlerConfig,
}

/// Browser process configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Path to the Chrome/Chromium executable (auto-detected when absent)
    pub executable: Option<PathBuf>,

    /// Keep the Chrome sandbox enabled
    pub sandbox: bool,

    /// Run without a visible window
    pub headless: bool,

    /// User agent presented to visited sites
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Viewport width in pixels
    #[serde(rename = "window-width")]
    pub window_width: u32,

    /// Viewport height in pixels
    #[serde(rename = "window-height")]
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            sandbox: true,
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_width: 1280,
            window_height: 800,
        }
    }
}

/// Timeouts for every slow step of a crawl (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum time for the browser process to start
    #[serde(rename = "launch-ms")]
    pub launch_ms: u64,

    /// Maximum time until the DOM of the landing page is parsed
    #[serde(rename = "navigation-ms")]
    pub navigation_ms: u64,

    /// Fixed wait after load for client-rendered content
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Maximum time for the screenshot
    #[serde(rename = "capture-ms")]
    pub capture_ms: u64,

    /// Maximum time for the browser process to exit
    #[serde(rename = "close-ms")]
    pub close_ms: u64,
}

impl TimeoutConfig {
    pub fn launch(&self) -> Duration {
        Duration::from_millis(self.launch_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn capture(&self) -> Duration {
        Duration::from_millis(self.capture_ms)
    }

    pub fn close(&self) -> Duration {
        Duration::from_millis(self.close_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            launch_ms: 30_000,
            navigation_ms: 30_000,
            settle_ms: 5_000,
            capture_ms: 30_000,
            close_ms: 10_000,
        }
    }
}

/// Thumbnail generation and storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Root directory served as public assets
    #[serde(rename = "public-root")]
    pub public_root: PathBuf,

    /// Image directory, relative to the public root
    pub directory: String,

    /// Thumbnail box width in pixels
    #[serde(rename = "thumbnail-width")]
    pub thumbnail_width: u32,

    /// Thumbnail box height in pixels
    #[serde(rename = "thumbnail-height")]
    pub thumbnail_height: u32,

    /// Also write the raw screenshot next to its thumbnail
    #[serde(rename = "keep-raw-captures")]
    pub keep_raw_captures: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            public_root: PathBuf::from("public"),
            directory: "images/snapshots".to_string(),
            thumbnail_width: 800,
            thumbnail_height: 600,
            keep_raw_captures: true,
        }
    }
}

/// Crawl concurrency configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of browser processes running at once
    #[serde(rename = "max-concurrent-sessions")]
    pub max_concurrent_sessions: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: 4,
        }
    }
}
