//! Output module for batch statistics and reports
//!
//! This module handles:
//! - Aggregating crawl outcomes into statistics
//! - Generating markdown reports of a batch

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{print_statistics, BatchStatistics};
