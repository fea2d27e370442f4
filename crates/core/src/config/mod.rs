//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (JOBSCRAPE_*)
//! 2. TOML config file (if JOBSCRAPE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, JOB_PATTERN_GROUPS, is_sql_identifier};

/// Which record extractor to run over page bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Parse the markup and walk the element tree.
    Structural,
    /// Match a multi-group pattern over the raw markup text.
    Pattern,
}

/// Where extracted records end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Json,
    Sqlite,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (JOBSCRAPE_*)
/// 2. TOML config file (if JOBSCRAPE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Paginated job-listing endpoint. Also the cache key prefix.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Directory holding one file per cached page.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// SQLite page store used instead of `cache_dir` when set.
    #[serde(default)]
    pub cache_db: Option<PathBuf>,

    /// Extra request headers sent with every listing request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// JSON file with a header object, merged under `headers`.
    #[serde(default)]
    pub headers_file: Option<PathBuf>,

    /// JSON body template for listing requests.
    #[serde(default = "default_request_template")]
    pub request_template: serde_json::Value,

    /// JSON file replacing `request_template` when set.
    #[serde(default)]
    pub template_file: Option<PathBuf>,

    /// Envelope field holding the markup fragment.
    #[serde(default = "default_envelope_field")]
    pub envelope_field: String,

    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    /// Selector for the repeating job card element.
    #[serde(default = "default_container_selector")]
    pub container_selector: String,

    /// Selector for the element carrying the job identifier.
    #[serde(default = "default_id_selector")]
    pub id_selector: String,

    /// Attribute holding the job identifier.
    #[serde(default = "default_id_attr")]
    pub id_attr: String,

    /// Selector for the element carrying the `href`.
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// Selector for the title element.
    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    /// Override for the pattern strategy's container delimiter.
    #[serde(default)]
    pub container_pattern: Option<String>,

    /// Override for the pattern strategy, applied inside each container.
    /// Must define the named groups `id`, `href` and `title`.
    #[serde(default)]
    pub job_pattern: Option<String>,

    #[serde(default = "default_sink")]
    pub sink: SinkKind,

    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Table rewritten by the SQLite sink.
    #[serde(default = "default_table")]
    pub table: String,

    /// First page index requested.
    #[serde(default)]
    pub start_page: u32,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Index page for the news topic scraper.
    #[serde(default = "default_news_url")]
    pub news_url: String,

    /// Maximum number of articles visited by the news topic scraper.
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,

    #[serde(default = "default_topics_path")]
    pub topics_path: PathBuf,
}

fn default_endpoint() -> String {
    "https://www.lejobadequat.com/emplois".into()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_request_template() -> serde_json::Value {
    serde_json::json!({ "data": {} })
}

fn default_envelope_field() -> String {
    "template".into()
}

fn default_strategy() -> Strategy {
    Strategy::Structural
}

fn default_container_selector() -> String {
    "article".into()
}

fn default_id_selector() -> String {
    "div[data-job-id]".into()
}

fn default_id_attr() -> String {
    "data-job-id".into()
}

fn default_link_selector() -> String {
    "a[href]".into()
}

fn default_title_selector() -> String {
    "h3.jobCard_title".into()
}

fn default_sink() -> SinkKind {
    SinkKind::Json
}

fn default_json_path() -> PathBuf {
    PathBuf::from("job_records.json")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("job_records.db")
}

fn default_table() -> String {
    crate::sink::DEFAULT_TABLE.into()
}

fn default_user_agent() -> String {
    "jobscrape/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_news_url() -> String {
    "https://www.bbc.com/sport".into()
}

fn default_news_limit() -> usize {
    20
}

fn default_topics_path() -> PathBuf {
    PathBuf::from("news_topics.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            cache_dir: default_cache_dir(),
            cache_db: None,
            headers: BTreeMap::new(),
            headers_file: None,
            request_template: default_request_template(),
            template_file: None,
            envelope_field: default_envelope_field(),
            strategy: default_strategy(),
            container_selector: default_container_selector(),
            id_selector: default_id_selector(),
            id_attr: default_id_attr(),
            link_selector: default_link_selector(),
            title_selector: default_title_selector(),
            container_pattern: None,
            job_pattern: None,
            sink: default_sink(),
            json_path: default_json_path(),
            db_path: default_db_path(),
            table: default_table(),
            start_page: 0,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            news_url: default_news_url(),
            news_limit: default_news_limit(),
            topics_path: default_topics_path(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// After merging, `headers_file` and `template_file` are read and folded
    /// in, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - A referenced headers/template file is unreadable or not JSON
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("JOBSCRAPE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("JOBSCRAPE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let mut config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.resolve_files()?;
        config.validate()?;

        Ok(config)
    }

    /// Fold `headers_file` and `template_file` into the in-memory values.
    ///
    /// Headers set directly in configuration win over those from the file.
    pub fn resolve_files(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = &self.headers_file {
            let from_file: BTreeMap<String, String> = read_json(path)?;
            for (name, value) in from_file {
                self.headers.entry(name).or_insert(value);
            }
        }

        if let Some(path) = &self.template_file {
            self.request_template = read_json(path)?;
        }

        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::LoadFailed(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::LoadFailed(format!("{}: {e}", path.display())))
}
