//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierStatus`: lifecycle of a frontier record (pending or crawled)
//! - `CrawlOutcome`: what the crawl driver decided for one URL in one iteration

mod frontier_status;
mod outcome;

pub use frontier_status::FrontierStatus;
pub use outcome::CrawlOutcome;
