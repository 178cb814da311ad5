//! Robots.txt handling module
//!
//! The [`RobotsGate`] is loaded once per domain before the crawl starts and
//! answers two questions for the crawl driver: may this URL be fetched, and
//! how long should the crawler wait between requests.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Transport;
use std::time::Duration;
use url::Url;

/// Robots policy for one domain
#[derive(Debug, Clone)]
pub struct RobotsGate {
    /// `None` when robots.txt is not consulted at all
    policy: Option<ParsedRobots>,
    user_agent: String,
}

impl RobotsGate {
    /// A gate that allows every URL and declares no delay
    pub fn disabled() -> Self {
        Self {
            policy: None,
            user_agent: String::new(),
        }
    }

    /// A gate enforcing an already parsed policy
    pub fn enforcing(policy: ParsedRobots, user_agent: &str) -> Self {
        Self {
            policy: Some(policy),
            user_agent: user_agent.to_string(),
        }
    }

    /// Fetches and parses the robots.txt of the seed's domain
    ///
    /// Never fails: a missing, unreachable or unreadable robots.txt degrades
    /// to an allow-all policy with a warning.
    pub async fn load<T: Transport>(
        transport: &T,
        seed: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Self {
        let policy = match fetch_robots(transport, seed, timeout).await {
            Ok(content) => {
                tracing::info!("Loaded robots.txt for {}", seed.host_str().unwrap_or(""));
                ParsedRobots::from_content(&content)
            }
            Err(reason) => {
                tracing::warn!("Failed to read robots.txt, allowing all URLs: {}", reason);
                ParsedRobots::allow_all()
            }
        };

        Self::enforcing(policy, user_agent)
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.is_some()
    }

    /// Checks if a URL may be fetched
    pub fn allowed(&self, url: &str) -> bool {
        match &self.policy {
            Some(policy) => policy.is_allowed(url, &self.user_agent),
            None => true,
        }
    }

    /// Delay requested by robots.txt for this crawler, if any
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.policy
            .as_ref()
            .and_then(|policy| policy.crawl_delay(&self.user_agent))
    }
}

/// Location of the robots.txt for the seed's scheme, host and port
pub fn robots_url(seed: &Url) -> Option<Url> {
    seed.join("/robots.txt").ok()
}

/// Delay to apply between fetches
///
/// A robots.txt delay can only raise the configured delay.
pub fn effective_delay(configured: Duration, robots: Option<Duration>) -> Duration {
    match robots {
        Some(robots) if robots > configured => robots,
        _ => configured,
    }
}

async fn fetch_robots<T: Transport>(
    transport: &T,
    seed: &Url,
    timeout: Duration,
) -> Result<String, String> {
    let url = robots_url(seed).ok_or_else(|| format!("no robots.txt location for {}", seed))?;

    let response = transport
        .get(url.as_str(), timeout)
        .await
        .map_err(|e| e.to_string())?;

    if !(200..300).contains(&response.status) {
        return Err(format!("HTTP {} from {}", response.status, url));
    }

    String::from_utf8(response.body).map_err(|e| format!("robots.txt is not UTF-8: {}", e))
}
