//! Storage module for persisting the crawl frontier
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Frontier record insertion, refresh and result recording
//! - Pending-set loading for resumption
//!
//! Each crawled domain gets its own database file under the storage directory.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteFrontier;
pub use traits::{FrontierStore, StorageError, StorageResult};

use crate::state::FrontierStatus;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A URL known to the frontier of one domain
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierRecord {
    pub id: i64,
    pub url: String,
    pub domain: String,
    pub status: FrontierStatus,
    pub inserted_at: DateTime<Utc>,
    pub crawled_at: Option<DateTime<Utc>>,
    /// Page body (base64 for binary payloads) or the error description
    pub content: Option<String>,
    pub content_hash: Option<String>,
}

/// Location of the frontier database for a domain
///
/// The port separator is replaced so the file name stays portable.
pub fn database_path(db_dir: &Path, domain: &str) -> PathBuf {
    let file_name = format!("crawled_data_{}.db", domain.replace(':', "_"));
    db_dir.join(file_name)
}

/// Opens the frontier store for a domain
///
/// When `resume` is set the store must already exist; otherwise the storage
/// directory and database are created as needed.
///
/// # Returns
///
/// * `Ok(SqliteFrontier)` - Store ready for use
/// * `Err(CrawlError::MissingStore)` - Resume requested but no store exists
/// * `Err(CrawlError)` - Failed to create the directory or open the database
pub fn open_storage(db_dir: &Path, domain: &str, resume: bool) -> crate::Result<SqliteFrontier> {
    let path = database_path(db_dir, domain);

    if resume && !path.exists() {
        return Err(CrawlError::MissingStore { path });
    }

    std::fs::create_dir_all(db_dir)?;
    tracing::debug!("Opening frontier store at {}", path.display());

    Ok(SqliteFrontier::open(&path)?)
}
