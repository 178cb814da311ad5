//! Fetch policy
//!
//! This module turns single transport calls into a fetch with retries:
//! - Classifying each attempt as success, retryable or terminal failure
//! - Exponential backoff between retryable attempts
//! - Decoding the body once into text or binary content
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx | Success |
//! | HTTP 5xx | Retry, backoff doubles each time |
//! | Timeout | Retry, backoff doubles each time |
//! | HTTP 4xx and other statuses | Fail immediately |
//! | Connection refused, TLS, other transport errors | Fail immediately |

use crate::config::FetchSettings;
use crate::crawler::transport::{FetchError, HttpResponse, Transport};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use encoding_rs::{Encoding, UTF_8};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::time::Duration;

/// Decoded page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Body served with a textual Content-Type
    Text(String),
    /// Any other body, kept as raw bytes
    Binary(Vec<u8>),
}

impl PageContent {
    /// Decodes a body according to its Content-Type
    ///
    /// Textual bodies are decoded with the declared charset (UTF-8 when none
    /// is given or the label is unknown). A body that does not decode cleanly
    /// is kept as binary so nothing is lost.
    pub fn from_response(content_type: Option<&str>, body: Vec<u8>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Binary(body);
        };
        if !content_type.to_ascii_lowercase().contains("text/") {
            return Self::Binary(body);
        }

        let encoding = charset(content_type)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);

        if encoding == UTF_8 {
            return match String::from_utf8(body) {
                Ok(text) => Self::Text(text),
                Err(e) => Self::Binary(e.into_bytes()),
            };
        }

        let decoded = encoding
            .decode_without_bom_handling_and_without_replacement(&body)
            .map(Cow::into_owned);
        match decoded {
            Some(text) => Self::Text(text),
            None => Self::Binary(body),
        }
    }

    /// Representation stored in the frontier: text verbatim, binary as base64
    pub fn as_stored(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Binary(bytes) => Cow::Owned(BASE64.encode(bytes)),
        }
    }

    /// The text body, if this content can contain links
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// The `charset` parameter of a Content-Type value
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Computes the SHA-256 content fingerprint of a stored payload
///
/// Returns the hex-encoded digest (64 characters).
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Outcome of a single transport call
#[derive(Debug)]
pub enum Attempt {
    Success(PageContent),
    Retryable(String),
    Terminal(String),
}

impl Attempt {
    /// Classifies the result of one transport call
    pub fn classify(result: Result<HttpResponse, FetchError>) -> Self {
        match result {
            Ok(response) if (200..300).contains(&response.status) => Self::Success(
                PageContent::from_response(response.content_type.as_deref(), response.body),
            ),
            Ok(response) if (500..600).contains(&response.status) => {
                Self::Retryable(format!("HTTP {} server error", response.status))
            }
            Ok(response) => Self::Terminal(format!("HTTP Error {}", response.status)),
            Err(FetchError::Timeout(e)) => Self::Retryable(format!("Timeout: {}", e)),
            Err(e) => Self::Terminal(e.to_string()),
        }
    }
}

/// Result of a fetch after all retries
#[derive(Debug)]
pub enum FetchResult {
    /// Page retrieved
    Fetched(PageContent),

    /// Page could not be retrieved
    Failed {
        /// Error description stored on the frontier record
        error: String,
        /// Number of transport calls made
        attempts: u32,
    },
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts
    pub max_attempts: u32,
    /// Timeout of the first attempt, also the first backoff delay
    pub initial_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_timeout,
        }
    }

    /// Timeout for the given attempt (1-based); also the backoff applied
    /// after that attempt fails
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_timeout.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(60))
    }
}

impl From<&FetchSettings> for RetryPolicy {
    fn from(settings: &FetchSettings) -> Self {
        Self::new(settings.max_retries, settings.initial_timeout())
    }
}

/// Fetches pages through a transport with retries and backoff
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a URL
    ///
    /// Backoff sleeps run on the calling task before the next attempt.
    /// Nothing is persisted here; the caller records the result.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let max_attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let timeout = self.policy.timeout_for(attempt);
            tracing::debug!(
                "GET {} (attempt {}/{}, timeout {:?})",
                url,
                attempt,
                max_attempts,
                timeout
            );

            match Attempt::classify(self.transport.get(url, timeout).await) {
                Attempt::Success(content) => return FetchResult::Fetched(content),
                Attempt::Terminal(error) => {
                    tracing::error!("Failed to fetch {}: {}", url, error);
                    return FetchResult::Failed {
                        error,
                        attempts: attempt,
                    };
                }
                Attempt::Retryable(error) => {
                    if attempt < max_attempts {
                        tracing::warn!(
                            "{} for {}. Retrying in {:?} (attempt {}/{})",
                            error,
                            url,
                            timeout,
                            attempt,
                            max_attempts
                        );
                        tokio::time::sleep(timeout).await;
                    }
                    last_error = error;
                }
            }
        }

        let error = format!("Giving up after {} attempts: {}", max_attempts, last_error);
        tracing::error!("Failed to fetch {}: {}", url, error);
        FetchResult::Failed {
            error,
            attempts: max_attempts,
        }
    }
}
