//! Crawl coordinator - single-URL crawl orchestration
//!
//! Drives one browser session through navigation and capture, classifies the
//! extracted links, and turns the capture into a stored thumbnail. Stage
//! failures are recorded on the result; only invalid input and a browser that
//! cannot start end the crawl with an error.

use crate::classifier::classify;
use crate::config::Config;
use crate::crawler::result::{CrawlRequest, CrawlResult, Stage, StageFailure, ThumbnailArtifact};
use crate::session::{ChromiumLauncher, SessionGuard, SessionLauncher};
use crate::thumbnail::{resize_contain_blocking, ImageStore};
use crate::url::normalize_request_url;
use crate::CrawlError;
use std::sync::Arc;
use url::Url;

/// Main crawl coordinator structure
pub struct Coordinator<L: SessionLauncher> {
    config: Arc<Config>,
    launcher: L,
    store: ImageStore,
}

impl<L: SessionLauncher> Coordinator<L> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `launcher` - Source of browser sessions
    pub fn new(config: Config, launcher: L) -> Self {
        let store = ImageStore::from_config(&config.images);
        Self {
            config: Arc::new(config),
            launcher,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Crawls one URL
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl ran; stage flags say what succeeded
    /// * `Err(CrawlError)` - The URL is invalid or the browser could not start
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlResult, CrawlError> {
        let url = normalize_request_url(&request.url)?;
        tracing::info!("Crawling {}", url);

        let session = self.launcher.open().await?;
        let mut guard = SessionGuard::new(session, url.as_str());

        let mut result = CrawlResult::unnavigated(request.url.as_str(), url.as_str());

        let outcome = match guard
            .navigate(&url, self.config.timeouts.navigation())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Navigation failed for {}: {}", url, e);
                result.failures.push(StageFailure::new(Stage::Navigation, &e));
                guard.release().await;
                return Ok(result);
            }
        };
        result.navigation_succeeded = true;

        let capture = guard.capture().await;
        guard.release().await;

        result.page_title = outcome.page_title;
        let final_url = match Url::parse(&outcome.final_url) {
            Ok(final_url) => final_url,
            Err(e) => {
                tracing::debug!(
                    "Browser reported unparsable URL {:?} ({}), using {}",
                    outcome.final_url,
                    e,
                    url
                );
                url.clone()
            }
        };
        result.final_url = final_url.to_string();

        result.classified_links = classify(&final_url, &outcome.raw_links);
        result.has_affiliate_program = result.classified_links.has_affiliate_program();

        match capture {
            Ok(raw) => {
                result.capture_succeeded = true;
                result.thumbnail = self.store_thumbnail(raw, &mut result.failures).await;
            }
            Err(e) => {
                tracing::warn!("Capture failed for {}: {}", url, e);
                result.failures.push(StageFailure::new(Stage::Capture, &e));
            }
        }

        tracing::info!(
            "Crawled {} -> {} ({} links, {} categories, thumbnail: {})",
            request.url,
            result.final_url,
            outcome.raw_links.len(),
            result.classified_links.categories.len(),
            result.thumbnail.is_some()
        );

        Ok(result)
    }

    /// Resizes a raw capture and stores it with its thumbnail
    async fn store_thumbnail(
        &self,
        raw: Vec<u8>,
        failures: &mut Vec<StageFailure>,
    ) -> Option<ThumbnailArtifact> {
        if let Err(e) = self.store.ensure_dir().await {
            tracing::warn!("Image directory unavailable: {}", e);
            failures.push(StageFailure::new(Stage::Store, &e));
            return None;
        }

        let id = self.store.allocate();

        if self.config.images.keep_raw_captures {
            if let Err(e) = self.store.write_raw(id, &raw).await {
                tracing::warn!("Failed to write raw capture {}: {}", id, e);
                failures.push(StageFailure::new(Stage::Store, &e));
            }
        }

        let images = &self.config.images;
        let thumbnail =
            match resize_contain_blocking(raw, images.thumbnail_width, images.thumbnail_height)
                .await
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Thumbnail resize failed for {}: {}", id, e);
                    failures.push(StageFailure::new(Stage::Resize, &e));
                    return None;
                }
            };

        match self.store.write_thumbnail(id, &thumbnail).await {
            Ok(relative_path) => Some(ThumbnailArtifact {
                relative_path,
                resize_succeeded: true,
            }),
            Err(e) => {
                tracing::warn!("Failed to write thumbnail {}: {}", id, e);
                failures.push(StageFailure::new(Stage::Store, &e));
                None
            }
        }
    }
}

/// Crawls one URL with a Chromium browser
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `request` - The URL to crawl
pub async fn crawl(config: Config, request: CrawlRequest) -> Result<CrawlResult, CrawlError> {
    let launcher = ChromiumLauncher::new(&config);
    Coordinator::new(config, launcher).crawl(request).await
}
