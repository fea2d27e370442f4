//! Page-indexed fetching for the job-listing endpoint.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value, json};

use jobscrape_core::{ContentCache, Error, KeyValueStore};

use super::FetchClient;

/// Source of raw page bodies, addressed by page index.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Endpoint identity; together with the page index it forms the cache
    /// key material.
    fn endpoint(&self) -> &str;

    /// Fetch the raw body of page `page`.
    async fn fetch_page(&self, page: u32) -> Result<String, Error>;
}

/// Render the request body for `page` from `template`.
///
/// Sets `data.load_more = [page]` and `data.paged = page` on a copy of the
/// template, creating `data` when absent. A non-object template or `data`
/// is replaced by an object.
pub fn render_request(template: &Value, page: u32) -> Value {
    let mut root = match template {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    let mut data = match root.remove("data") {
        Some(Value::Object(data)) => data,
        _ => Map::new(),
    };

    data.insert("load_more".to_string(), json!([page]));
    data.insert("paged".to_string(), json!(page));
    root.insert("data".to_string(), Value::Object(data));

    Value::Object(root)
}

/// POSTs the templated request for each page to the listing endpoint.
#[derive(Debug, Clone)]
pub struct JobListingFetcher {
    client: FetchClient,
    endpoint: String,
    headers: HeaderMap,
    template: Value,
}

impl JobListingFetcher {
    pub fn new(client: FetchClient, endpoint: impl Into<String>, headers: HeaderMap, template: Value) -> Self {
        Self { client, endpoint: endpoint.into(), headers, template }
    }
}

#[async_trait]
impl PageFetcher for JobListingFetcher {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_page(&self, page: u32) -> Result<String, Error> {
        let body = render_request(&self.template, page);
        let response = self.client.post_json(&self.endpoint, &self.headers, &body).await?;
        Ok(response.body)
    }
}

/// Serves pages from a [`ContentCache`], falling through to the inner
/// fetcher on a miss.
#[derive(Debug)]
pub struct CachedFetcher<F, S> {
    inner: F,
    cache: ContentCache<S>,
}

impl<F: PageFetcher, S: KeyValueStore> CachedFetcher<F, S> {
    pub fn new(inner: F, cache: ContentCache<S>) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn cache(&self) -> &ContentCache<S> {
        &self.cache
    }
}

#[async_trait]
impl<F: PageFetcher, S: KeyValueStore> PageFetcher for CachedFetcher<F, S> {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn fetch_page(&self, page: u32) -> Result<String, Error> {
        self.cache
            .get_or_fetch(self.inner.endpoint(), page, || self.inner.fetch_page(page))
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Serves canned bodies and counts calls. Unknown pages are a network error.
    pub struct FakeFetcher {
        pub endpoint: String,
        pub pages: HashMap<u32, String>,
        pub calls: AtomicUsize,
    }

    impl FakeFetcher {
        pub fn new(pages: impl IntoIterator<Item = (u32, String)>) -> Self {
            Self {
                endpoint: "https://jobs.example.com/emplois".to_string(),
                pages: pages.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn empty() -> Self {
            Self::new(Vec::<(u32, String)>::new())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        async fn fetch_page(&self, page: u32) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(&page)
                .cloned()
                .ok_or_else(|| Error::HttpError(format!("network error: no page {page}")))
        }
    }
}
