//! Key-value storage behind the content cache.
//!
//! The cache only needs two capabilities, `get` and `put`. The filesystem
//! backing keeps one file per key inside a directory; the in-memory backing
//! exists so tests never touch disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::Error;

/// Minimal key-value capability set used by [`ContentCache`](super::ContentCache).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key` unless the key is already present.
    ///
    /// The first value written for a key is kept; later writes are no-ops.
    async fn put(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// Filesystem-backed store: `<dir>/<key>` holds the value as UTF-8 text.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    /// Use `dir` as the cache directory. It is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// List every regular file in the cache directory as `(key, body)`,
    /// sorted by key.
    ///
    /// A missing directory is an empty cache.
    pub async fn entries(&self) -> Result<Vec<(String, String)>, Error> {
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                keys.push(name.to_string());
            }
        }
        keys.sort();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let body = tokio::fs::read_to_string(self.path_for(&key)).await?;
            entries.push((key, body));
        }
        Ok(entries)
    }
}

#[async_trait]
impl KeyValueStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let opened = tokio::fs::OpenOptions::new().write(true).create_new(true).open(self.path_for(key)).await;
        let mut file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::debug!(key, "cache entry already present, keeping it");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock().entry(key.to_string()).or_insert_with(|| value.to_string());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::scratch_dir;
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.put("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_fs_store_missing_key() {
        let store = FsStore::new(scratch_dir("fs-missing"));
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_creates_dir_on_put() {
        let dir = scratch_dir("fs-put");
        let store = FsStore::new(&dir);

        store.put("abc", "{\"template\":\"\"}").await.unwrap();

        assert!(dir.join("abc").is_file());
        assert_eq!(store.get("abc").await.unwrap().as_deref(), Some("{\"template\":\"\"}"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_store_entries_sorted() {
        let dir = scratch_dir("fs-entries");
        let store = FsStore::new(&dir);
        store.put("bbb", "second").await.unwrap();
        store.put("aaa", "first").await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(
            entries,
            vec![("aaa".to_string(), "first".to_string()), ("bbb".to_string(), "second".to_string())]
        );

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_keeps_first_write() {
        let store = MemoryStore::new();
        store.put("k", "first").await.unwrap();
        store.put("k", "second").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_fs_store_keeps_first_write() {
        let dir = scratch_dir("fs-first");
        let store = FsStore::new(&dir);

        store.put("k", "first").await.unwrap();
        store.put("k", "second").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
        assert_eq!(tokio::fs::read_to_string(dir.join("k")).await.unwrap(), "first");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_store_entries_missing_dir() {
        let store = FsStore::new(scratch_dir("fs-none"));
        assert!(store.entries().await.unwrap().is_empty());
    }
}
