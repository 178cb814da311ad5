//! HTTP transport
//!
//! The transport performs exactly one GET per call. Retries, backoff and
//! content classification all live in the fetcher, so the transport can be
//! replaced by a scripted double in tests.

use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Raw response returned by a transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

/// Transport-level failures
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Performs a single GET request
pub trait Transport {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>>;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the transport with the crawler's user agent
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// Per-request timeouts are set by the fetcher, since they grow with every
/// retry.
///
/// # Example
///
/// ```no_run
/// use tidemark::crawler::build_http_client;
///
/// let client = build_http_client("TestCrawler/1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("TestCrawler/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetch_error_display() {
        let error = FetchError::Timeout("operation timed out".to_string());
        assert_eq!(error.to_string(), "Timeout: operation timed out");
    }
}
