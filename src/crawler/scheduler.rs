//! Scheduler bounding how many browser processes run at once
//!
//! Every crawl holds a semaphore permit for its whole duration, so at most
//! `max-concurrent-sessions` browsers are alive regardless of how many URLs
//! are submitted.

use crate::crawler::coordinator::Coordinator;
use crate::crawler::result::{CrawlRequest, CrawlResult};
use crate::session::SessionLauncher;
use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Outcome of one URL in a batch
#[derive(Debug)]
pub struct BatchEntry {
    /// URL as submitted
    pub url: String,

    pub outcome: Result<CrawlResult, CrawlError>,
}

/// Runs crawls concurrently behind a global permit pool
pub struct Scheduler<L: SessionLauncher + 'static> {
    coordinator: Arc<Coordinator<L>>,

    /// Global semaphore for limiting concurrent browser sessions
    permits: Arc<Semaphore>,

    max_sessions: usize,
}

impl<L: SessionLauncher + 'static> Scheduler<L> {
    /// Creates a scheduler sized from the coordinator's configuration
    pub fn new(coordinator: Coordinator<L>) -> Self {
        let max_sessions = coordinator.config().crawler.max_concurrent_sessions.max(1) as usize;
        Self {
            coordinator: Arc::new(coordinator),
            permits: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
        }
    }

    pub fn coordinator(&self) -> &Coordinator<L> {
        &self.coordinator
    }

    /// Number of permits not currently held by a crawl
    pub fn available_sessions(&self) -> usize {
        self.permits.available_permits()
    }

    /// Crawls one URL once a permit is available
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlResult, CrawlError> {
        run_with_permit(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.permits),
            request,
        )
        .await
    }

    /// Crawls every URL concurrently and returns the outcomes in input order
    pub async fn crawl_all(&self, urls: Vec<String>) -> Vec<BatchEntry> {
        tracing::info!(
            "Scheduling {} crawls with at most {} concurrent sessions",
            urls.len(),
            self.max_sessions
        );

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let coordinator = Arc::clone(&self.coordinator);
                let permits = Arc::clone(&self.permits);
                let request = CrawlRequest::new(url.clone());
                tokio::spawn(run_with_permit(coordinator, permits, request))
            })
            .collect();

        let mut entries = Vec::with_capacity(urls.len());
        for (url, handle) in urls.into_iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Crawl task for {} did not complete: {}", url, e);
                    Err(CrawlError::Task(e.to_string()))
                }
            };
            entries.push(BatchEntry { url, outcome });
        }

        entries
    }
}

async fn run_with_permit<L: SessionLauncher + 'static>(
    coordinator: Arc<Coordinator<L>>,
    permits: Arc<Semaphore>,
    request: CrawlRequest,
) -> Result<CrawlResult, CrawlError> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| CrawlError::Task(e.to_string()))?;
    tracing::trace!("Acquired session permit for {}", request.url);

    coordinator.crawl(request).await
}
