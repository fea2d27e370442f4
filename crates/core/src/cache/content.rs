//! Fetch-through cache for raw response bodies.

use std::future::Future;

use super::hash::compute_cache_key;
use super::store::KeyValueStore;
use crate::Error;

/// Maps (endpoint, page) to the first body ever fetched for it.
///
/// There is no expiry, no revalidation and no eviction: a stored body is
/// returned as-is forever, and the backing store only grows. Concurrent
/// writers on the same key are not coordinated.
#[derive(Debug)]
pub struct ContentCache<S> {
    store: S,
}

impl<S: KeyValueStore> ContentCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the cached body for `(endpoint, page)`, or run `fetch`, store
    /// its body under the derived key and return it.
    ///
    /// Store errors and `fetch` errors propagate unchanged; nothing is
    /// retried and a failed fetch stores nothing.
    pub async fn get_or_fetch<F, Fut>(&self, endpoint: &str, page: u32, fetch: F) -> Result<String, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, Error>>,
    {
        let key = compute_cache_key(endpoint, page);

        if let Some(body) = self.store.get(&key).await? {
            tracing::debug!(%key, page, "retrieved from cache");
            return Ok(body);
        }

        let body = fetch().await?;
        self.store.put(&key, &body).await?;
        tracing::debug!(%key, page, bytes = body.len(), "retrieved from server");

        Ok(body)
    }
}
