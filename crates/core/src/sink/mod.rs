//! Persistence sinks for extracted job records.
//!
//! A sink receives the whole record list in one call and replaces whatever
//! it previously held; there is no append or incremental mode.

mod json;
mod sqlite;

pub use json::JsonFileSink;
pub use sqlite::{DEFAULT_TABLE, SqliteSink};

use async_trait::async_trait;

use crate::{Error, JobRecord};

/// Outcome of a sink write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    /// All records were written.
    Committed { rows: usize },
    /// The write was abandoned and nothing from this batch was kept.
    ///
    /// Returned instead of an error so the caller's run finishes normally;
    /// callers that care about durability must inspect it.
    RolledBack { reason: String },
}

impl Persisted {
    pub fn is_committed(&self) -> bool {
        matches!(self, Persisted::Committed { .. })
    }
}

/// Destination for a finished record list, selected by the caller.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Replace the sink's contents with `records`.
    async fn persist(&self, records: &[JobRecord]) -> Result<Persisted, Error>;
}
