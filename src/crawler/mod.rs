//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport and fetching with retry logic
//! - HTML link extraction
//! - Re-crawl staleness decisions
//! - The crawl driver loop

mod driver;
mod fetcher;
mod parser;
mod staleness;
pub(crate) mod transport;

pub use driver::{CrawlDriver, CrawlReport};
pub use fetcher::{compute_hash, Attempt, FetchResult, Fetcher, PageContent, RetryPolicy};
pub use parser::extract_links;
pub use staleness::{is_due, should_refetch, should_refetch_at};
pub use transport::{build_http_client, FetchError, HttpResponse, ReqwestTransport, Transport};

use crate::config::Config;
use crate::robots::RobotsGate;
use crate::storage::open_storage;
use crate::url::{extract_domain, normalize_url};
use crate::{Result, UrlError};

/// Runs a complete crawl for a validated configuration
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open (or, when resuming, require) the domain's frontier store
/// 2. Build the HTTP transport
/// 3. Load robots.txt if configured
/// 4. Run the crawl driver until the work list is empty
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished
/// * `Err(CrawlError)` - Missing seed, missing store on resume, or setup failure
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let seed = config
        .crawl
        .seed_url
        .as_deref()
        .ok_or_else(|| crate::ConfigError::InvalidSeed("a seed URL is required".to_string()))?;
    let seed = normalize_url(seed)?;
    let domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

    let store = open_storage(&config.paths.db_dir, &domain, config.crawl.resume)?;
    let transport = ReqwestTransport::new(&config.fetch.user_agent)?;

    let robots = if config.crawl.respect_robots {
        RobotsGate::load(
            &transport,
            &seed,
            &config.fetch.user_agent,
            config.fetch.initial_timeout(),
        )
        .await
    } else {
        RobotsGate::disabled()
    };

    let fetcher = Fetcher::new(transport, RetryPolicy::from(&config.fetch));
    let mut driver = CrawlDriver::new(&config.crawl, seed, store, fetcher, robots)?;

    Ok(driver.run().await)
}
