//! Crawl request and result data model

use crate::classifier::{CategoryFields, ClassifiedLinks};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One URL submitted for crawling; the URL may lack a scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub url: String,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Location of a generated thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailArtifact {
    /// Path relative to the public root, with forward slashes
    pub relative_path: String,

    /// Always true for an artifact the coordinator returns, since a failed
    /// resize produces no artifact at all
    pub resize_succeeded: bool,
}

/// Pipeline stage that can degrade without failing the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Navigation,
    Capture,
    Resize,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "navigation",
            Self::Capture => "capture",
            Self::Resize => "resize",
            Self::Store => "store",
        };
        write!(f, "{}", name)
    }
}

/// A degraded stage and its cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, error: impl fmt::Display) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

/// Everything one crawl attempt found out about a URL
///
/// Success flags report each stage independently; `failures` carries the
/// cause of every stage that degraded.
///
/// Serialized as the flat catalog record: `title`, per-category fields under
/// `classifiedLinks`, a top-level `allMatchedUrls` and `thumbnailPath`.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// URL as submitted
    pub requested_url: String,

    /// URL after redirects; the normalized request URL when navigation failed
    pub final_url: String,

    pub page_title: String,

    pub classified_links: ClassifiedLinks,

    /// Present only when a thumbnail was generated and stored
    pub thumbnail: Option<ThumbnailArtifact>,

    pub navigation_succeeded: bool,

    pub capture_succeeded: bool,

    pub has_affiliate_program: bool,

    pub crawled_at: DateTime<Utc>,

    pub failures: Vec<StageFailure>,
}

impl CrawlResult {
    /// Result for a URL whose page never loaded
    pub fn unnavigated(requested_url: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            requested_url: requested_url.into(),
            final_url: final_url.into(),
            page_title: String::new(),
            classified_links: ClassifiedLinks::default(),
            thumbnail: None,
            navigation_succeeded: false,
            capture_succeeded: false,
            has_affiliate_program: false,
            crawled_at: Utc::now(),
            failures: Vec::new(),
        }
    }

    /// Returns the failure recorded for `stage`, if any
    pub fn failure(&self, stage: Stage) -> Option<&StageFailure> {
        self.failures.iter().find(|f| f.stage == stage)
    }

    /// True when every stage succeeded
    pub fn is_complete(&self) -> bool {
        self.navigation_succeeded && self.capture_succeeded && self.thumbnail.is_some()
    }

    /// Public path of the thumbnail, if one was stored
    pub fn thumbnail_path(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|t| t.relative_path.as_str())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CrawlRecord<'a> {
    requested_url: &'a str,
    final_url: &'a str,
    title: &'a str,
    classified_links: CategoryFields<'a>,
    all_matched_urls: &'a [String],
    thumbnail_path: Option<&'a str>,
    navigation_succeeded: bool,
    capture_succeeded: bool,
    has_affiliate_program: bool,
    crawled_at: &'a DateTime<Utc>,
    failures: &'a [StageFailure],
}

impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CrawlRecord {
            requested_url: &self.requested_url,
            final_url: &self.final_url,
            title: &self.page_title,
            classified_links: self.classified_links.category_fields(),
            all_matched_urls: &self.classified_links.all_matched_urls,
            thumbnail_path: self.thumbnail_path(),
            navigation_succeeded: self.navigation_succeeded,
            capture_succeeded: self.capture_succeeded,
            has_affiliate_program: self.has_affiliate_program,
            crawled_at: &self.crawled_at,
            failures: &self.failures,
        }
        .serialize(serializer)
    }
}
