//! SQLite page store.
//!
//! An alternative [`KeyValueStore`] backing: page bodies live in a `pages`
//! table instead of one file per key. Writes are insert-if-absent so the
//! first stored body for a key is the one that stays.

use super::migrations;
use super::store::KeyValueStore;
use crate::Error;
use async_trait::async_trait;
use std::path::Path;
use tokio_rusqlite::rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA busy_timeout=5000;";

/// SQLite-backed page store; cloning shares the same background connection.
#[derive(Clone, Debug)]
pub struct PageDb {
    pub(crate) conn: Connection,
}

impl PageDb {
    /// Open (or create) the page database at `path` and bring its schema
    /// up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        let db = Self::init(conn).await?;
        tracing::debug!(path = %path.display(), "page store opened");
        Ok(db)
    }

    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS)).await.map_err(Error::Database)?;
        let version = migrations::run(&conn).await?;
        tracing::trace!(version, "page store schema ready");
        Ok(Self { conn })
    }

    /// Every stored page as `(key, body)`, ordered by key.
    pub async fn entries(&self) -> Result<Vec<(String, String)>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT key, body FROM pages ORDER BY key")?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored pages.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl KeyValueStore for PageDb {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let body = conn
                    .query_row("SELECT body FROM pages WHERE key = ?1", params![key], |row| row.get(0))
                    .optional()?;
                Ok(body)
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO pages (key, body, stored_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO NOTHING",
                    params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_file_persists_pages() {
        let dir = super::super::store::test_support::scratch_dir("page-db");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pages.db");

        let db = PageDb::open(&path).await.unwrap();
        db.put("k", "body").await.unwrap();
        drop(db);

        let reopened = PageDb::open(&path).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = PageDb::open_in_memory().await.unwrap();
        assert!(db.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let db = PageDb::open_in_memory().await.unwrap();
        db.put("k", "body").await.unwrap();
        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("body"));
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_first_write_wins() {
        let db = PageDb::open_in_memory().await.unwrap();
        db.put("k", "first").await.unwrap();
        db.put("k", "second").await.unwrap();

        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("first"));
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_sorted_by_key() {
        let db = PageDb::open_in_memory().await.unwrap();
        db.put("b", "2").await.unwrap();
        db.put("a", "1").await.unwrap();

        let entries = db.entries().await.unwrap();
        assert_eq!(entries, vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]);
    }
}
