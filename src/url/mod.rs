//! URL handling module for Site-Snapshot
//!
//! This module provides request URL normalization, link resolution against a
//! page URL, domain extraction, and wildcard host matching.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_site, site_host};
pub use matcher::matches_wildcard;
pub use normalize::{normalize_request_url, resolve_link};
