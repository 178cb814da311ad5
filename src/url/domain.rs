use url::Url;

/// Extracts the crawl domain from a URL
///
/// The domain is the lowercase host plus an explicit port when one is given,
/// so two servers on the same host but different ports get separate
/// frontiers.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tidemark::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true when both URLs belong to the same crawl domain
pub fn is_same_site(url: &Url, base: &Url) -> bool {
    match (extract_domain(url), extract_domain(base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
