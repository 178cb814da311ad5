//! Re-crawl staleness policy
//!
//! A crawled URL is fetched again only once its last crawl is older than the
//! configured re-crawl interval.

use crate::storage::{FrontierStore, StorageResult};
use chrono::{DateTime, Duration, Utc};

/// Returns true when a page crawled at `crawled_at` is due for a new visit
///
/// Never-crawled pages are always due. A page is fresh while the elapsed time
/// is at most `interval`.
pub fn is_due(crawled_at: Option<DateTime<Utc>>, interval: Duration, now: DateTime<Utc>) -> bool {
    match crawled_at {
        None => true,
        Some(crawled_at) => now - crawled_at > interval,
    }
}

/// Decides whether `url` should be fetched now
pub fn should_refetch<S>(store: &S, url: &str, interval: Duration) -> StorageResult<bool>
where
    S: FrontierStore + ?Sized,
{
    should_refetch_at(store, url, interval, Utc::now())
}

/// `should_refetch` with an explicit clock
pub fn should_refetch_at<S>(
    store: &S,
    url: &str,
    interval: Duration,
    now: DateTime<Utc>,
) -> StorageResult<bool>
where
    S: FrontierStore + ?Sized,
{
    Ok(is_due(store.crawled_at(url)?, interval, now))
}
