//! Statistics over a batch of crawl outcomes

use crate::classifier::LinkCategory;
use crate::crawler::{BatchEntry, Stage};
use std::collections::BTreeMap;

/// Batch statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatistics {
    /// Number of URLs submitted
    pub total: u64,

    /// URLs that ended with a crawl error (bad input, browser start failure)
    pub fatal_errors: u64,

    pub navigation_succeeded: u64,

    pub capture_succeeded: u64,

    pub thumbnails_written: u64,

    /// Sites with an off-site affiliate link
    pub affiliate_programs: u64,

    /// How many sites had a link in each category
    pub links_by_category: BTreeMap<LinkCategory, u64>,

    /// Degraded stages and their counts
    pub failures_by_stage: BTreeMap<String, u64>,
}

impl BatchStatistics {
    /// Aggregates a batch of outcomes
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut stats = Self {
            total: entries.len() as u64,
            ..Self::default()
        };

        for entry in entries {
            let result = match &entry.outcome {
                Ok(result) => result,
                Err(_) => {
                    stats.fatal_errors += 1;
                    continue;
                }
            };

            if result.navigation_succeeded {
                stats.navigation_succeeded += 1;
            }
            if result.capture_succeeded {
                stats.capture_succeeded += 1;
            }
            if result.thumbnail.is_some() {
                stats.thumbnails_written += 1;
            }
            if result.has_affiliate_program {
                stats.affiliate_programs += 1;
            }

            for category in result.classified_links.categories.keys() {
                *stats.links_by_category.entry(*category).or_insert(0) += 1;
            }
            for failure in &result.failures {
                *stats
                    .failures_by_stage
                    .entry(failure.stage.to_string())
                    .or_insert(0) += 1;
            }
        }

        stats
    }

    /// Share of submitted URLs whose page loaded, in percent
    pub fn navigation_rate(&self) -> f64 {
        percentage(self.navigation_succeeded, self.total)
    }

    /// Number of failures recorded for `stage`
    pub fn stage_failures(&self, stage: Stage) -> u64 {
        self.failures_by_stage
            .get(&stage.to_string())
            .copied()
            .unwrap_or(0)
    }
}

pub(crate) fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout carries the JSON results, so the summary goes to stderr.
pub fn print_statistics(stats: &BatchStatistics) {
    eprintln!("=== Snapshot Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  URLs submitted: {}", stats.total);
    eprintln!(
        "  Navigated: {} ({:.1}%)",
        stats.navigation_succeeded,
        stats.navigation_rate()
    );
    eprintln!("  Captured: {}", stats.capture_succeeded);
    eprintln!("  Thumbnails written: {}", stats.thumbnails_written);
    eprintln!("  Affiliate programs: {}", stats.affiliate_programs);
    eprintln!("  Fatal errors: {}", stats.fatal_errors);
    eprintln!();

    if !stats.links_by_category.is_empty() {
        eprintln!("Links by Category:");
        for (category, count) in &stats.links_by_category {
            eprintln!("  {}: {}", category, count);
        }
        eprintln!();
    }

    if !stats.failures_by_stage.is_empty() {
        eprintln!("Degraded Stages:");
        let mut counts: Vec<_> = stats.failures_by_stage.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (stage, count) in counts {
            eprintln!("  {}: {}", stage, count);
        }
        eprintln!();
    }
}
