//! Disk-backed response cache.
//!
//! This module provides a content-addressed cache for raw page bodies:
//!
//! - Keys are SHA-256 hex digests of endpoint + page index
//! - A `KeyValueStore` seam with filesystem, in-memory and SQLite backings
//! - First write wins; no TTL, no eviction

pub mod connection;
pub mod content;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::PageDb;
pub use content::ContentCache;
pub use hash::compute_cache_key;
pub use store::{FsStore, KeyValueStore, MemoryStore};
