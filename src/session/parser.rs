//! HTML parser for extracting anchor links and the page title
//!
//! Links are kept exactly as written in the markup; resolving them against
//! the page URL is the classifier's job.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracted information from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from the `<title>` tag)
    pub title: Option<String>,

    /// Anchor hrefs as written, deduplicated in document order
    pub raw_links: Vec<String>,
}

/// Parses rendered HTML and extracts anchor hrefs and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, relative or absolute
///
/// **Exclude:**
/// - empty hrefs
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - fragment-only links (same page anchors)
///
/// # Example
///
/// ```
/// use site_snapshot::session::parse_page;
///
/// let html = r#"<html><head><title>Tool</title></head>
///     <body><a href="/pricing">Pricing</a><a href="/pricing">Again</a></body></html>"#;
/// let parsed = parse_page(html);
/// assert_eq!(parsed.title, Some("Tool".to_string()));
/// assert_eq!(parsed.raw_links, vec!["/pricing".to_string()]);
/// ```
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        raw_links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts anchor hrefs from the HTML document
fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let href = href.trim();
        if is_excluded(href) {
            continue;
        }

        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }

    links
}

/// Returns true for hrefs that can never point at another page
fn is_excluded(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return true;
    }

    let lower = href.to_ascii_lowercase();
    lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}
