//! Statistics from the frontier store
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics and crawl run reports.

use crate::crawler::CrawlReport;
use crate::state::FrontierStatus;
use crate::storage::{FrontierStore, StorageResult};

/// Frontier statistics summary for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierStatistics {
    /// Records waiting to be fetched
    pub pending: u64,

    /// Records fetched at least once, successfully or not
    pub crawled: u64,
}

impl FrontierStatistics {
    pub fn total(&self) -> u64 {
        self.pending + self.crawled
    }
}

/// Loads statistics from a frontier store
pub fn load_statistics<S>(store: &S) -> StorageResult<FrontierStatistics>
where
    S: FrontierStore + ?Sized,
{
    Ok(FrontierStatistics {
        pending: store.count_by_status(FrontierStatus::Pending)?,
        crawled: store.count_by_status(FrontierStatus::Crawled)?,
    })
}

/// Prints frontier statistics to stdout
pub fn print_statistics(domain: &str, stats: &FrontierStatistics) {
    println!("=== Frontier Statistics: {} ===\n", domain);

    println!("  Total URLs: {}", stats.total());
    println!("  Pending: {} ({:.1}%)", stats.pending, percentage(stats.pending, stats.total()));
    println!("  Crawled: {} ({:.1}%)", stats.crawled, percentage(stats.crawled, stats.total()));
}

/// Prints the outcome tally of a finished run to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("  URLs processed: {}", report.total());
    println!("  Crawled: {}", report.crawled);
    println!("  Failed: {}", report.failed);
    println!("  Duplicate content: {}", report.duplicates);
    println!("  Skipped (robots.txt): {}", report.skipped_robots);
    println!("  Skipped (crawled recently): {}", report.skipped_fresh);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
