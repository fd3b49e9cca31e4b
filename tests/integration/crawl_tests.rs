//! Integration tests for the crawl coordinator and scheduler
//!
//! These tests drive the full crawl cycle with a scripted browser session so
//! that every stage outcome (and every release path) can be exercised
//! without a real browser.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use site_snapshot::config::Config;
use site_snapshot::crawler::{Coordinator, CrawlRequest, Scheduler, Stage};
use site_snapshot::{
    BrowserSession, CaptureError, CrawlError, LaunchError, NavigationError, NavigationOutcome,
    ReleaseError, SessionLauncher, SessionState, UrlError,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

/// What the scripted session does at navigation
#[derive(Clone)]
enum Navigate {
    Succeed { title: String, links: Vec<String> },
    Redirect { to: String, links: Vec<String> },
    Fail,
    Hang,
}

/// What the scripted session does at capture
#[derive(Clone)]
enum Capture {
    Png(Vec<u8>),
    Bytes(Vec<u8>),
    Fail,
}

#[derive(Default)]
struct Spy {
    launches: AtomicUsize,
    closes: AtomicUsize,
    open_now: AtomicUsize,
    max_open: AtomicUsize,
    navigations: AtomicUsize,
}

impl Spy {
    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn open_now(&self) -> usize {
        self.open_now.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct ScriptedLauncher {
    navigate: Navigate,
    capture: Capture,
    fail_launch: bool,
    fail_close: bool,
    navigate_delay: Duration,
    spy: Arc<Spy>,
}

impl ScriptedLauncher {
    fn new(navigate: Navigate, capture: Capture) -> Self {
        Self {
            navigate,
            capture,
            fail_launch: false,
            fail_close: false,
            navigate_delay: Duration::ZERO,
            spy: Arc::new(Spy::default()),
        }
    }
}

struct ScriptedSession {
    script: ScriptedLauncher,
    state: SessionState,
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn open(&self) -> Result<ScriptedSession, LaunchError> {
        self.spy.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(LaunchError::Browser("no chrome here".to_string()));
        }

        let now = self.spy.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.spy.max_open.fetch_max(now, Ordering::SeqCst);

        Ok(ScriptedSession {
            script: self.clone(),
            state: SessionState::Open,
        })
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
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
        self.script.spy.navigations.fetch_add(1, Ordering::SeqCst);

        if !self.script.navigate_delay.is_zero() {
            tokio::time::sleep(self.script.navigate_delay).await;
        }

        let result = match &self.script.navigate {
            Navigate::Succeed { title, links } => Ok(NavigationOutcome {
                final_url: url.to_string(),
                page_title: title.clone(),
                raw_links: links.clone(),
            }),
            Navigate::Redirect { to, links } => Ok(NavigationOutcome {
                final_url: to.clone(),
                page_title: "Redirected".to_string(),
                raw_links: links.clone(),
            }),
            Navigate::Fail => Err(NavigationError::from_chrome_error(
                url.as_str(),
                "net::ERR_NAME_NOT_RESOLVED",
                timeout,
            )),
            Navigate::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        self.state = if result.is_ok() {
            SessionState::Navigated
        } else {
            SessionState::NavigationFailed
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

        let result = match &self.script.capture {
            Capture::Png(bytes) | Capture::Bytes(bytes) => Ok(bytes.clone()),
            Capture::Fail => Err(CaptureError::Timeout(Duration::from_secs(30))),
        };

        self.state = if result.is_ok() {
            SessionState::Captured
        } else {
            SessionState::CaptureFailed
        };
        result
    }

    async fn close(&mut self) -> Result<(), ReleaseError> {
        if self.state.advance(SessionState::Closing).is_err() {
            return Ok(());
        }
        self.script.spy.closes.fetch_add(1, Ordering::SeqCst);
        self.script.spy.open_now.fetch_sub(1, Ordering::SeqCst);
        self.state = SessionState::Closed;

        if self.script.fail_close {
            Err(ReleaseError::Browser("process already gone".to_string()))
        } else {
            Ok(())
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }
}

/// Encodes a solid-colour PNG of the given size
fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([20, 120, 220, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Creates a test configuration writing images under `root`
fn create_test_config(root: &TempDir) -> Config {
    let mut config = Config::default();
    config.images.public_root = root.path().to_path_buf();
    config.images.thumbnail_width = 160;
    config.images.thumbnail_height = 120;
    config.timeouts.navigation_ms = 1_000;
    config.timeouts.settle_ms = 0;
    config
}

fn links(hrefs: &[&str]) -> Vec<String> {
    hrefs.iter().map(|s| s.to_string()).collect()
}

fn succeed(links: Vec<String>) -> Navigate {
    Navigate::Succeed {
        title: "Example Tool".to_string(),
        links,
    }
}

#[tokio::test]
async fn test_end_to_end_without_scheme() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(
        succeed(links(&["/pricing", "/about", "#top"])),
        Capture::Png(png(1280, 2400)),
    );
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("example.com"))
        .await
        .unwrap();

    assert_eq!(result.requested_url, "example.com");
    assert_eq!(result.final_url, "https://example.com/");
    assert_eq!(result.page_title, "Example Tool");
    assert!(result.navigation_succeeded);
    assert!(result.capture_succeeded);
    assert!(result.classified_links.is_empty());
    assert!(result.classified_links.all_matched_urls.is_empty());
    assert!(!result.has_affiliate_program);
    assert!(result.failures.is_empty());

    let record = serde_json::to_value(&result).unwrap();
    assert_eq!(record["finalUrl"], "https://example.com/");
    assert_eq!(record["title"], "Example Tool");
    assert_eq!(record["allMatchedUrls"], serde_json::json!([]));
    assert!(record["classifiedLinks"]["twitter"].is_null());
    assert_eq!(
        record["thumbnailPath"].as_str(),
        result.thumbnail.as_ref().map(|t| t.relative_path.as_str())
    );

    let thumbnail = result.thumbnail.expect("thumbnail should be produced");
    assert!(thumbnail.resize_succeeded);
    assert!(thumbnail.relative_path.starts_with("images/snapshots/"));
    assert!(thumbnail.relative_path.ends_with("-thumb.png"));

    let written = image::open(root.path().join(&thumbnail.relative_path)).unwrap();
    assert_eq!((written.width(), written.height()), (160, 120));

    assert_eq!(spy.launches(), 1);
    assert_eq!(spy.closes(), 1);
    assert_eq!(spy.open_now(), 0);
}

#[tokio::test]
async fn test_raw_capture_kept_next_to_thumbnail() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(300, 300)));
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("https://tool.example"))
        .await
        .unwrap();

    let relative = result.thumbnail.unwrap().relative_path;
    let raw_relative = relative.replace("-thumb.png", "-raw.png");
    assert!(root.path().join(raw_relative).is_file());
}

#[tokio::test]
async fn test_raw_capture_discarded_when_disabled() {
    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.images.keep_raw_captures = false;
    let launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(300, 300)));
    let coordinator = Coordinator::new(config, launcher);

    coordinator
        .crawl(CrawlRequest::new("https://tool.example"))
        .await
        .unwrap();

    let files: Vec<_> = std::fs::read_dir(root.path().join("images/snapshots"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("-thumb.png"));
}

#[tokio::test]
async fn test_two_crawls_produce_distinct_files() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(64, 64)));
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let first = coordinator
        .crawl(CrawlRequest::new("example.com"))
        .await
        .unwrap();
    let second = coordinator
        .crawl(CrawlRequest::new("example.com"))
        .await
        .unwrap();

    assert_ne!(
        first.thumbnail.unwrap().relative_path,
        second.thumbnail.unwrap().relative_path
    );
}

#[tokio::test]
async fn test_links_classified_against_final_url() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(
        Navigate::Redirect {
            to: "https://www.tool.example/en/".to_string(),
            links: links(&[
                "https://twitter.com/tool_first",
                "https://x.com/tool_second",
                "/affiliates",
                "https://tool.example/partners",
                "https://github.com/tool",
                "http://[broken",
                "https://tool.partnerstack.com/apply",
                "../app-download",
                "https://apps.apple.com/us/app/tool/id123",
            ]),
        },
        Capture::Png(png(100, 100)),
    );
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();
    let links = &result.classified_links;

    assert_eq!(result.final_url, "https://www.tool.example/en/");
    assert_eq!(links.twitter(), Some("https://twitter.com/tool_first"));
    assert_eq!(links.github(), Some("https://github.com/tool"));
    assert_eq!(
        links.app_store(),
        Some("https://apps.apple.com/us/app/tool/id123")
    );
    assert_eq!(
        links.affiliate(),
        Some("https://tool.partnerstack.com/apply")
    );
    assert!(result.has_affiliate_program);
    assert!(links
        .all_matched_urls
        .contains(&"https://github.com/tool".to_string()));
    assert!(links
        .all_matched_urls
        .contains(&"https://x.com/tool_second".to_string()));
    assert!(!links
        .all_matched_urls
        .iter()
        .any(|u| u.starts_with("https://www.tool.example")));
}

#[tokio::test]
async fn test_affiliate_found_on_shared_link_and_own_subdomain() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(
        succeed(links(&["https://github.com/partners?ref=tool"])),
        Capture::Png(png(40, 40)),
    );
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();
    assert_eq!(
        result.classified_links.github(),
        Some("https://github.com/partners?ref=tool")
    );
    assert_eq!(
        result.classified_links.affiliate(),
        Some("https://github.com/partners?ref=tool")
    );
    assert!(result.has_affiliate_program);

    let launcher = ScriptedLauncher::new(
        succeed(links(&["/affiliates", "https://affiliates.tool.example/join"])),
        Capture::Png(png(40, 40)),
    );
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();
    assert_eq!(
        result.classified_links.affiliate(),
        Some("https://affiliates.tool.example/join")
    );
}

#[tokio::test]
async fn test_navigation_failure_result_shape() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(Navigate::Fail, Capture::Png(png(10, 10)));
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("unreachable.example"))
        .await
        .unwrap();

    assert!(!result.navigation_succeeded);
    assert!(!result.capture_succeeded);
    assert!(result.classified_links.is_empty());
    assert!(result.thumbnail.is_none());
    assert!(!result.has_affiliate_program);
    assert_eq!(result.final_url, "https://unreachable.example/");

    let record = serde_json::to_value(&result).unwrap();
    assert!(record["thumbnailPath"].is_null());
    assert_eq!(record["navigationSucceeded"], false);

    let failure = result.failure(Stage::Navigation).unwrap();
    assert!(failure.message.contains("DNS"));

    assert_eq!(spy.closes(), 1);
    assert_eq!(spy.open_now(), 0);
}

#[tokio::test]
async fn test_capture_failure_still_classifies() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(
        succeed(links(&["https://instagram.com/tool"])),
        Capture::Fail,
    );
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();

    assert!(result.navigation_succeeded);
    assert!(!result.capture_succeeded);
    assert!(result.thumbnail.is_none());
    assert_eq!(
        result.classified_links.instagram(),
        Some("https://instagram.com/tool")
    );
    assert!(result.failure(Stage::Capture).is_some());

    assert_eq!(spy.closes(), 1);
    assert_eq!(spy.open_now(), 0);
}

#[tokio::test]
async fn test_corrupt_capture_yields_no_thumbnail() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(
        succeed(links(&["https://youtu.be/demo"])),
        Capture::Bytes(b"not a png".to_vec()),
    );
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();

    assert!(result.navigation_succeeded);
    assert!(result.capture_succeeded);
    assert!(result.thumbnail.is_none());
    assert!(result.failure(Stage::Resize).is_some());
    assert_eq!(result.classified_links.youtube(), Some("https://youtu.be/demo"));
    assert_eq!(spy.closes(), 1);
}

#[tokio::test]
async fn test_invalid_input_launches_nothing() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(10, 10)));
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    for input in ["", "   ", "mailto:team@tool.example", "ftp://tool.example/"] {
        let err = coordinator
            .crawl(CrawlRequest::new(input))
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::InvalidInput(_)), "{}", input);
    }

    let err = coordinator.crawl(CrawlRequest::new("")).await.unwrap_err();
    assert!(matches!(err, CrawlError::InvalidInput(UrlError::Empty)));

    assert_eq!(spy.launches(), 0);
}

#[tokio::test]
async fn test_launch_failure_is_an_error() {
    let root = TempDir::new().unwrap();
    let mut launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(10, 10)));
    launcher.fail_launch = true;
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let err = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Launch(_)));
    assert_eq!(spy.launches(), 1);
    assert_eq!(spy.closes(), 0);
}

#[tokio::test]
async fn test_release_failure_not_surfaced() {
    let root = TempDir::new().unwrap();
    let mut launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(32, 32)));
    launcher.fail_close = true;
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let result = coordinator
        .crawl(CrawlRequest::new("tool.example"))
        .await
        .unwrap();

    assert!(result.navigation_succeeded);
    assert!(result.thumbnail.is_some());
    assert!(result.failures.is_empty());
    assert_eq!(spy.closes(), 1);
}

#[tokio::test]
async fn test_cancellation_releases_session() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(Navigate::Hang, Capture::Png(png(10, 10)));
    let spy = launcher.spy.clone();
    let coordinator = Coordinator::new(create_test_config(&root), launcher);

    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        coordinator.crawl(CrawlRequest::new("slow.example")),
    )
    .await;
    assert!(cancelled.is_err());

    // The close runs on a background task spawned when the crawl was dropped
    for _ in 0..50 {
        if spy.closes() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(spy.navigations.load(Ordering::SeqCst), 1);
    assert_eq!(spy.closes(), 1);
    assert_eq!(spy.open_now(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scheduler_bounds_concurrent_sessions() {
    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.crawler.max_concurrent_sessions = 2;

    let mut launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(16, 16)));
    launcher.navigate_delay = Duration::from_millis(30);
    let spy = launcher.spy.clone();

    let scheduler = Scheduler::new(Coordinator::new(config, launcher));
    let urls: Vec<String> = (0..6).map(|i| format!("site{}.example", i)).collect();

    let entries = scheduler.crawl_all(urls.clone()).await;

    assert_eq!(entries.len(), 6);
    for (entry, url) in entries.iter().zip(&urls) {
        assert_eq!(&entry.url, url);
        let result = entry.outcome.as_ref().unwrap();
        assert_eq!(result.final_url, format!("https://{}/", url));
    }

    assert_eq!(spy.launches(), 6);
    assert_eq!(spy.closes(), 6);
    assert!(spy.max_open.load(Ordering::SeqCst) <= 2);
    assert_eq!(scheduler.available_sessions(), 2);
}

#[tokio::test]
async fn test_scheduler_keeps_errors_in_place() {
    let root = TempDir::new().unwrap();
    let launcher = ScriptedLauncher::new(succeed(vec![]), Capture::Png(png(16, 16)));
    let scheduler = Scheduler::new(Coordinator::new(create_test_config(&root), launcher));

    let entries = scheduler
        .crawl_all(vec![
            "good.example".to_string(),
            "".to_string(),
            "also-good.example".to_string(),
        ])
        .await;

    assert!(entries[0].outcome.is_ok());
    assert!(matches!(
        entries[1].outcome,
        Err(CrawlError::InvalidInput(UrlError::Empty))
    ));
    assert!(entries[2].outcome.is_ok());
}
