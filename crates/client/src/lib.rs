//! Client code for jobscrape.
//!
//! This crate provides the HTTP fetch layer, job record extraction, the
//! pagination driver, and the news topic scraper used by the CLI.

pub mod extract;
pub mod fetch;
pub mod news;
pub mod paginate;

pub use extract::{
    Extractor, PatternExtractor, ScanReport, StructuralExtractor, TextScanner, extract_batch, extract_or_skip,
    unwrap_envelope,
};
pub use fetch::{CachedFetcher, FetchClient, FetchConfig, FetchResponse, JobListingFetcher, PageFetcher};
pub use news::{ArticleTopics, collect_topics};
pub use paginate::{PageRun, Paginator};
