//! Database schema definitions
//!
//! One database file holds the frontier of a single domain.

/// SQL schema for the frontier table
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crawled_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL,
    date_inserted TEXT NOT NULL,
    date_crawled TEXT,
    link TEXT NOT NULL,
    content TEXT,
    content_hash TEXT,
    status TEXT NOT NULL CHECK(status IN ('pending', 'crawled')),
    UNIQUE(domain, link),
    CHECK((content IS NULL) = (content_hash IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_crawled_data_link ON crawled_data(link);
CREATE INDEX IF NOT EXISTS idx_crawled_data_status ON crawled_data(status);
CREATE INDEX IF NOT EXISTS idx_crawled_data_status_link ON crawled_data(status, link);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_indexes_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for index in [
            "idx_crawled_data_link",
            "idx_crawled_data_status",
            "idx_crawled_data_status_link",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
                    [index],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Index {} should exist", index);
        }
    }

    #[test]
    fn test_rejects_content_without_hash() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO crawled_data (domain, date_inserted, link, content, status)
             VALUES ('a.test', '2024-01-01T00:00:00Z', 'http://a.test/', 'body', 'crawled')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_status() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO crawled_data (domain, date_inserted, link, status)
             VALUES ('a.test', '2024-01-01T00:00:00Z', 'http://a.test/', 'fetching')",
            [],
        );
        assert!(result.is_err());
    }
}
