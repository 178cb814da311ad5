//! HTML link extraction
//!
//! Pulls the followable, same-domain links out of a fetched page.

use crate::url::{is_same_site, normalize_url};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all same-domain links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything on a different host or port than `base_url`
///
/// Fragments are stripped, and each URL appears once, in document order.
///
/// # Example
///
/// ```
/// use tidemark::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/x">X</a><a href="http://other.test/y">Y</a>"#;
/// let base_url = Url::parse("http://a.test/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec![Url::parse("http://a.test/x").unwrap()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(link) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if !is_same_site(&link, base_url) {
            tracing::trace!("Ignoring off-site link: {}", link);
            continue;
        }

        if seen.insert(link.as_str().to_string()) {
            links.push(link);
        }
    }

    links
}

/// Resolves a link href to an absolute, normalized URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_absolute_same_site_link() {
        let html = r#"<a href="https://example.com/abs">Link</a>"#;
        assert_eq!(links(html), vec!["https://example.com/abs"]);
    }

    #[test]
    fn test_skip_other_hosts() {
        let html = r#"
            <a href="https://other.com/page">Other</a>
            <a href="https://sub.example.com/page">Subdomain</a>
            <a href="https://example.com:8443/page">Other port</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<a href="/file.pdf" download>Download</a>"#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<a href="#section">Jump</a>"##;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_fragments_stripped_and_deduplicated() {
        let html = r##"
            <a href="/doc#intro">Intro</a>
            <a href="/doc#usage">Usage</a>
            <a href="/doc">Doc</a>
        "##;
        assert_eq!(links(html), vec!["https://example.com/doc"]);
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"
            <a href="/c">C</a>
            <a href="/a">A</a>
            <a href="/b">B</a>
            <a href="/a">A again</a>
        "#;
        assert_eq!(
            links(html),
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }

    #[test]
    fn test_no_links_in_plain_text() {
        assert!(links("just some text, no markup").is_empty());
    }
}
