//! SQLite persistence for discovered URLs.
//!
//! The store is append-only: one row per (query, url) pair, timestamped by
//! SQLite. Reads exist only for the `history` command.

use crate::error::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A stored query/url row
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRecord {
    pub id: i64,
    pub search_query: String,
    pub url: String,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, as produced by `CURRENT_TIMESTAMP`
    pub scraped_on: String,
}

/// URL store backed by a SQLite file
pub struct UrlStore {
    db_path: PathBuf,
}

impl UrlStore {
    /// Open a store at `db_path`. The file is created lazily on first use.
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Create the `urls` table if it does not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                search_query TEXT,
                url TEXT,
                scraped_on DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        debug!(path = ?self.db_path, "Schema ready");
        Ok(())
    }

    /// Insert one row per url for `search_query` in a single transaction.
    pub fn insert_urls(&self, search_query: &str, urls: &[String]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO urls (search_query, url) VALUES (?1, ?2)")?;
            for url in urls {
                stmt.execute(params![search_query, url])?;
            }
        }
        tx.commit()?;

        info!(query = search_query, count = urls.len(), "Saved URLs to database");
        Ok(urls.len())
    }

    /// Most recent rows first, optionally restricted to one query.
    pub fn recent(&self, search_query: Option<&str>, limit: usize) -> Result<Vec<QueryRecord>> {
        let conn = self.connect()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT id, search_query, url, scraped_on FROM urls
             WHERE ?1 IS NULL OR search_query = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![search_query, limit], |row| {
                Ok(QueryRecord {
                    id: row.get(0)?,
                    search_query: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    scraped_on: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
