//! Markdown report generation
//!
//! Renders a batch of crawl outcomes as a human-readable report for the
//! operator reviewing new directory entries.

use crate::crawler::BatchEntry;
use crate::output::stats::{percentage, BatchStatistics};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for a batch
///
/// # Arguments
///
/// * `entries` - Batch outcomes in submission order
/// * `config_hash` - Hash of the configuration used, if one was loaded
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(
    entries: &[BatchEntry],
    config_hash: Option<&str>,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(entries, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a batch of outcomes as markdown
pub fn format_markdown_report(entries: &[BatchEntry], config_hash: Option<&str>) -> String {
    let stats = BatchStatistics::from_entries(entries);
    let mut md = String::new();

    md.push_str("# Site Snapshot Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        chrono::Utc::now().to_rfc3339()
    ));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URLs Submitted**: {}\n", stats.total));
    md.push_str(&format!(
        "- **Navigated**: {} ({:.2}%)\n",
        stats.navigation_succeeded,
        stats.navigation_rate()
    ));
    md.push_str(&format!(
        "- **Captured**: {} ({:.2}%)\n",
        stats.capture_succeeded,
        percentage(stats.capture_succeeded, stats.total)
    ));
    md.push_str(&format!(
        "- **Thumbnails Written**: {}\n",
        stats.thumbnails_written
    ));
    md.push_str(&format!(
        "- **Affiliate Programs**: {}\n",
        stats.affiliate_programs
    ));
    md.push_str(&format!("- **Fatal Errors**: {}\n\n", stats.fatal_errors));

    if !stats.links_by_category.is_empty() {
        md.push_str("## Links by Category\n\n");
        md.push_str("| Category | Sites |\n");
        md.push_str("|----------|-------|\n");
        for (category, count) in &stats.links_by_category {
            md.push_str(&format!("| {} | {} |\n", category, count));
        }
        md.push('\n');
    }

    md.push_str("## Sites\n\n");
    md.push_str("| URL | Title | Navigated | Captured | Thumbnail | Affiliate |\n");
    md.push_str("|-----|-------|-----------|----------|-----------|-----------|\n");
    for entry in entries {
        match &entry.outcome {
            Ok(result) => {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    escape_cell(&result.final_url),
                    escape_cell(&result.page_title),
                    yes_no(result.navigation_succeeded),
                    yes_no(result.capture_succeeded),
                    result
                        .thumbnail
                        .as_ref()
                        .map(|t| escape_cell(&t.relative_path))
                        .unwrap_or_else(|| "-".to_string()),
                    yes_no(result.has_affiliate_program),
                ));
            }
            Err(_) => {
                md.push_str(&format!(
                    "| {} | - | error | - | - | - |\n",
                    escape_cell(&entry.url)
                ));
            }
        }
    }
    md.push('\n');

    let problems: Vec<String> = entries
        .iter()
        .flat_map(|entry| match &entry.outcome {
            Ok(result) => result
                .failures
                .iter()
                .map(|f| format!("- `{}` {}: {}\n", entry.url, f.stage, f.message))
                .collect::<Vec<_>>(),
            Err(e) => vec![format!("- `{}` fatal: {}\n", entry.url, e)],
        })
        .collect();

    if !problems.is_empty() {
        md.push_str("## Problems\n\n");
        for line in problems {
            md.push_str(&line);
        }
        md.push('\n');
    }

    md
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Keeps pipes and newlines from breaking table rows
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
