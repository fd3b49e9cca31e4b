/// Checks if a host matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "twitter.com" matches only "twitter.com"
/// 2. Wildcard match: "*.twitter.com" matches:
///    - "twitter.com" (the bare host)
///    - "mobile.twitter.com" (single subdomain)
///    - "a.b.twitter.com" (nested subdomains)
///
/// Hosts are expected to be lowercase already; matching is case-sensitive.
///
/// # Examples
///
/// ```
/// use site_snapshot::url::matches_wildcard;
///
/// assert!(matches_wildcard("apps.apple.com", "apps.apple.com"));
/// assert!(!matches_wildcard("apps.apple.com", "apple.com"));
///
/// assert!(matches_wildcard("*.github.com", "github.com"));
/// assert!(matches_wildcard("*.github.com", "gist.github.com"));
/// assert!(!matches_wildcard("*.github.com", "github.io"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
