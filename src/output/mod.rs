//! Output module for reporting crawl results
//!
//! Renders the end-of-run report and the per-domain frontier statistics
//! shown by `--stats`.

mod stats;

pub use stats::{load_statistics, print_report, print_statistics, FrontierStatistics};
