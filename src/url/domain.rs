use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase domain/host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_snapshot::url::extract_domain;
///
/// let url = Url::parse("https://Tool.Example.COM/pricing").unwrap();
/// assert_eq!(extract_domain(&url), Some("tool.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host identifying a site: lowercase, without a leading `www.`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_snapshot::url::site_host;
///
/// let url = Url::parse("https://www.example.com/").unwrap();
/// assert_eq!(site_host(&url), Some("example.com".to_string()));
/// ```
pub fn site_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => host,
    })
}

/// Checks whether `link` belongs to the site identified by `site`
///
/// A link is same-site when its host equals the site host, ignoring any
/// `www.` prefix on either side. Other subdomains count as different sites.
pub fn is_same_site(site: &Url, link: &Url) -> bool {
    match (site_host(site), site_host(link)) {
        (Some(site), Some(link)) => link == site,
        _ => false,
    }
}
