//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; the
//! Crawl-delay directive, which that crate ignores, is read here.

use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::time::Duration;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content; `None` means allow everything
    content: Option<String>,
    /// Crawl-delay per lowercase user-agent token as written in the file
    crawl_delays: HashMap<String, f64>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            crawl_delays: parse_crawl_delays(content),
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// This is used when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self {
            content: None,
            crawl_delays: HashMap::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The full user agent string; only its product token
    ///   (e.g. `Tidemark` in `Tidemark/1.0 (+...)`) is matched
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let Some(content) = self.content.as_deref() else {
            return true;
        };
        if content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(content, product_token(user_agent), url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent takes precedence over the `*` group. Values
    /// that do not fit a `Duration` are ignored.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        let token = product_token(user_agent).to_lowercase();

        self.crawl_delays
            .get(&token)
            .or_else(|| self.crawl_delays.get("*"))
            .and_then(|delay| Duration::try_from_secs_f64(*delay).ok())
    }
}

/// First token of a user agent string, before any `/` version or comment
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or(user_agent)
}

/// Collects `Crawl-delay` values keyed by the user agents of their group
///
/// Consecutive `User-agent` lines form one group; the first rule line after
/// them closes the agent list, so a following `User-agent` starts a new group.
fn parse_crawl_delays(content: &str) -> HashMap<String, f64> {
    let mut delays = HashMap::new();
    let mut group: Vec<String> = Vec::new();
    let mut group_has_rules = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                if group_has_rules {
                    group.clear();
                    group_has_rules = false;
                }
                group.push(product_token(value).to_lowercase());
            }
            "crawl-delay" => {
                group_has_rules = true;
                if let Ok(delay) = value.parse::<f64>() {
                    for agent in &group {
                        delays.entry(agent.clone()).or_insert(delay);
                    }
                }
            }
            _ => group_has_rules = true,
        }
    }

    delays
}
