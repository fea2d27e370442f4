//! HTTP fetch pipeline for listing pages and article pages.
//!
//! ### Request shapes
//! - Listing pages are POSTed with caller-supplied headers and a JSON body
//!   rendered from a template per page index (see [`page`]).
//! - Article and index pages for the news scraper are plain GETs.
//!
//! ### Failure policy
//! - Network errors and non-success statuses are `HTTP_ERROR`.
//! - No retry and no backoff; callers see the first failure.

pub mod page;
pub mod url;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode, Url, header};

pub use page::{CachedFetcher, JobListingFetcher, PageFetcher, render_request};
pub use url::{UrlError, canonicalize, resolve};

use jobscrape_core::{AppConfig, Error};

/// HTTP client settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Redirect hops followed before giving up.
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: 5 }
    }
}

/// A successful response, body already decoded.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Where the request ended up after redirects.
    pub final_url: Url,
    pub status: StatusCode,
    pub body: String,
    pub elapsed: Duration,
}

/// Thin HTTP client shared by the pipelines.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    /// GET an HTML page.
    pub async fn get(&self, url: &str) -> Result<FetchResponse, Error> {
        let url = parse(url)?;
        let request = self.http.get(url.clone()).header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8");
        self.send("GET", &url, request).await
    }

    /// POST `body` as JSON with `headers` added on top of the client defaults.
    pub async fn post_json(&self, url: &str, headers: &HeaderMap, body: &serde_json::Value) -> Result<FetchResponse, Error> {
        let url = parse(url)?;
        let request = self.http.post(url.clone()).headers(headers.clone()).json(body);
        self.send("POST", &url, request).await
    }

    async fn send(&self, method: &str, url: &Url, request: reqwest::RequestBuilder) -> Result<FetchResponse, Error> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| Error::HttpError(format!("{method} {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("{method} {url}: status {}", status.as_u16())));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::HttpError(format!("{method} {url}: reading body: {e}")))?;
        let elapsed = started.elapsed();

        tracing::debug!(method, %url, status = status.as_u16(), bytes = body.len(), ms = elapsed.as_millis() as u64, "response received");
        Ok(FetchResponse { final_url, status, body, elapsed })
    }
}

fn parse(url: &str) -> Result<Url, Error> {
    canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// Turn a name/value map into a header map, rejecting invalid entries.
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidInput(format!("invalid value for header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
