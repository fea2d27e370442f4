use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Persisted, RecordSink};
use crate::{Error, JobRecord};

/// Writes the record list as a single JSON array, overwriting the file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn persist(&self, records: &[JobRecord]) -> Result<Persisted, Error> {
        let json = serde_json::to_string(records)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(path = %self.path.display(), rows = records.len(), "job records written");
        Ok(Persisted::Committed { rows: records.len() })
    }
}
