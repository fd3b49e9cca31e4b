use crate::UrlError;
use url::Url;

/// Schemes that can never name a crawlable page
const NON_WEB_SCHEMES: &[&str] = &[
    "mailto",
    "javascript",
    "data",
    "tel",
    "file",
    "ftp",
    "blob",
    "about",
    "chrome",
];

/// Normalizes a caller-supplied URL into an absolute web URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Default the scheme to `https` when the input has none
/// 3. Parse the URL; reject if malformed
/// 4. Accept only `http` and `https`
/// 5. Require a host
///
/// The host is lowercased by the URL parser. Paths, queries and fragments are
/// left as supplied since the browser, not this crate, decides what they load.
///
/// # Arguments
///
/// * `input` - The URL string as submitted, possibly without a scheme
///
/// # Returns
///
/// * `Ok(Url)` - Absolute `http`/`https` URL
/// * `Err(UrlError)` - The input cannot name a web page
///
/// # Examples
///
/// ```
/// use site_snapshot::url::normalize_request_url;
///
/// let url = normalize_request_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn normalize_request_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        if let Some((prefix, _)) = trimmed.split_once(':') {
            let prefix = prefix.to_ascii_lowercase();
            if NON_WEB_SCHEMES.contains(&prefix.as_str()) {
                return Err(UrlError::InvalidScheme(prefix));
            }
        }
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Resolves an extracted href against the page it was found on
///
/// Returns `None` for hrefs that cannot be resolved or that resolve to
/// anything other than an `http`/`https` URL with a host.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" if resolved.host_str().is_some() => Some(resolved),
        _ => None,
    }
}
