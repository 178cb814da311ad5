use crate::UrlError;
use url::Url;

/// Normalizes a URL before it enters the frontier
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require the http or https scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host case and default ports are already canonicalized by the parser.
///
/// # Examples
///
/// ```
/// use tidemark::url::normalize_url;
///
/// let url = normalize_url("http://A.TEST/page#top").unwrap();
/// assert_eq!(url.as_str(), "http://a.test/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}
