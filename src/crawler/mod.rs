//! Crawler module for single-URL snapshot crawls
//!
//! This module contains:
//! - The request/result data model
//! - The coordinator that drives one browser session per URL
//! - The scheduler that bounds concurrent browser processes

mod coordinator;
mod result;
mod scheduler;

pub use coordinator::{crawl, Coordinator};
pub use result::{CrawlRequest, CrawlResult, Stage, StageFailure, ThumbnailArtifact};
pub use scheduler::{BatchEntry, Scheduler};
