//! Job listing records.

use serde::{Deserialize, Serialize};

/// One job card pulled out of a listing page.
///
/// Records carry no identity beyond their three fields; duplicates across
/// pages are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub job_title: String,
    pub href: String,
}

impl JobRecord {
    pub fn new(job_id: impl Into<String>, job_title: impl Into<String>, href: impl Into<String>) -> Self {
        Self { job_id: job_id.into(), job_title: job_title.into(), href: href.into() }
    }
}
