//! Storage traits and error types
//!
//! The crawl driver only talks to the frontier through [`FrontierStore`], so
//! the durable backend can be swapped without touching the crawl logic.

use crate::state::FrontierStatus;
use crate::storage::FrontierRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No frontier record for {0}")]
    RecordNotFound(String),

    #[error("Corrupt value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent, per-domain frontier of known URLs
pub trait FrontierStore {
    /// Records a discovered URL
    ///
    /// Inserts a new record with `status` if the URL is unknown, refreshes
    /// `inserted_at` if it is pending, and does nothing if it is crawled.
    fn enqueue(&mut self, domain: &str, url: &str, status: FrontierStatus) -> StorageResult<()>;

    /// Puts an existing record back into the pending set with a fresh
    /// `inserted_at`, keeping its content and `crawled_at`
    fn requeue(&mut self, url: &str) -> StorageResult<()>;

    /// Stores the outcome of a terminal fetch attempt and stamps `crawled_at`
    ///
    /// Calling this twice with the same arguments leaves the record in the
    /// same state (apart from the timestamp).
    fn record_result(
        &mut self,
        url: &str,
        content: &str,
        content_hash: &str,
        status: FrontierStatus,
    ) -> StorageResult<()>;

    /// All pending URLs in insertion order
    fn load_pending(&self) -> StorageResult<Vec<String>>;

    /// True when the store holds no records at all
    fn is_empty(&self) -> StorageResult<bool>;

    /// When the URL was last fetched, if ever
    fn crawled_at(&self, url: &str) -> StorageResult<Option<DateTime<Utc>>>;

    /// Full record lookup
    fn get_record(&self, url: &str) -> StorageResult<Option<FrontierRecord>>;

    /// Number of records with the given status
    fn count_by_status(&self, status: FrontierStatus) -> StorageResult<u64>;
}
