//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.

use crate::state::FrontierStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use crate::storage::FrontierRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str =
    "id, link, domain, status, date_inserted, date_crawled, content, content_hash";

/// SQLite frontier backend
pub struct SqliteFrontier {
    conn: Connection,
}

impl SqliteFrontier {
    /// Opens or creates a frontier database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteFrontier)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// `enqueue` with an explicit clock
    pub fn enqueue_at(
        &mut self,
        domain: &str,
        url: &str,
        status: FrontierStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let now = format_timestamp(now);

        let refreshed = self.conn.execute(
            "UPDATE crawled_data SET date_inserted = ?1 WHERE link = ?2 AND status = ?3",
            params![now, url, FrontierStatus::Pending.to_db_string()],
        )?;
        if refreshed > 0 {
            tracing::debug!("Refreshed pending link: {}", url);
            return Ok(());
        }

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO crawled_data (domain, date_inserted, link, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![domain, now, url, status.to_db_string()],
        )?;
        if inserted > 0 {
            tracing::debug!("Saved link: {} (status: {})", url, status);
        }

        Ok(())
    }

    /// `requeue` with an explicit clock
    pub fn requeue_at(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawled_data SET status = ?1, date_inserted = ?2 WHERE link = ?3",
            params![
                FrontierStatus::Pending.to_db_string(),
                format_timestamp(now),
                url
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RecordNotFound(url.to_string()));
        }
        Ok(())
    }

    /// `record_result` with an explicit clock
    pub fn record_result_at(
        &mut self,
        url: &str,
        content: &str,
        content_hash: &str,
        status: FrontierStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawled_data
             SET content = ?1, content_hash = ?2, status = ?3, date_crawled = ?4
             WHERE link = ?5",
            params![
                content,
                content_hash,
                status.to_db_string(),
                format_timestamp(now),
                url
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RecordNotFound(url.to_string()));
        }
        Ok(())
    }
}

impl FrontierStore for SqliteFrontier {
    fn enqueue(&mut self, domain: &str, url: &str, status: FrontierStatus) -> StorageResult<()> {
        self.enqueue_at(domain, url, status, Utc::now())
    }

    fn requeue(&mut self, url: &str) -> StorageResult<()> {
        self.requeue_at(url, Utc::now())
    }

    fn record_result(
        &mut self,
        url: &str,
        content: &str,
        content_hash: &str,
        status: FrontierStatus,
    ) -> StorageResult<()> {
        self.record_result_at(url, content, content_hash, status, Utc::now())
    }

    fn load_pending(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT link FROM crawled_data WHERE status = ?1 ORDER BY id")?;

        let links = stmt
            .query_map(params![FrontierStatus::Pending.to_db_string()], |row| {
                row.get(0)
            })?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(links)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        let exists: bool = self
            .conn
            .query_row("SELECT EXISTS(SELECT 1 FROM crawled_data)", [], |row| {
                row.get(0)
            })?;
        Ok(!exists)
    }

    fn crawled_at(&self, url: &str) -> StorageResult<Option<DateTime<Utc>>> {
        let raw: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT date_crawled FROM crawled_data WHERE link = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        raw.flatten()
            .map(|value| parse_timestamp("date_crawled", value))
            .transpose()
    }

    fn get_record(&self, url: &str) -> StorageResult<Option<FrontierRecord>> {
        let sql = format!("SELECT {} FROM crawled_data WHERE link = ?1", RECORD_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![url], RawRecord::from_row)
            .optional()?;

        raw.map(RawRecord::into_record).transpose()
    }

    fn count_by_status(&self, status: FrontierStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawled_data WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Row as stored, before timestamps and status are decoded
struct RawRecord {
    id: i64,
    url: String,
    domain: String,
    status: String,
    inserted_at: String,
    crawled_at: Option<String>,
    content: Option<String>,
    content_hash: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            domain: row.get(2)?,
            status: row.get(3)?,
            inserted_at: row.get(4)?,
            crawled_at: row.get(5)?,
            content: row.get(6)?,
            content_hash: row.get(7)?,
        })
    }

    fn into_record(self) -> StorageResult<FrontierRecord> {
        let status =
            FrontierStatus::from_db_string(&self.status).ok_or_else(|| StorageError::Corrupt {
                column: "status",
                value: self.status.clone(),
            })?;

        Ok(FrontierRecord {
            id: self.id,
            url: self.url,
            domain: self.domain,
            status,
            inserted_at: parse_timestamp("date_inserted", self.inserted_at)?,
            crawled_at: self
                .crawled_at
                .map(|value| parse_timestamp("date_crawled", value))
                .transpose()?,
            content: self.content,
            content_hash: self.content_hash,
        })
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &'static str, value: String) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| StorageError::Corrupt { column, value })
}
