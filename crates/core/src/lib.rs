//! Core types and shared functionality for jobscrape.
//!
//! This crate provides:
//! - Content-addressed page cache with pluggable storage
//! - Job records and persistence sinks (JSON file, SQLite table)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod record;
pub mod sink;

pub use cache::{ContentCache, FsStore, KeyValueStore, MemoryStore, PageDb};
pub use config::AppConfig;
pub use error::Error;
pub use record::JobRecord;
pub use sink::{JsonFileSink, Persisted, RecordSink, SqliteSink};
