//! Page-by-page driver for the listing endpoint.
//!
//! The endpoint gives no explicit last-page marker, so the loop stops at the
//! first page that yields zero records. That is an approximation: a
//! transient empty page ends the run exactly like the real end of data.

use jobscrape_core::{Error, JobRecord};

use crate::extract::{Extractor, extract_or_skip};
use crate::fetch::PageFetcher;

/// Summary of one pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRun {
    pub records: Vec<JobRecord>,
    /// Pages fetched, including the final empty one.
    pub pages_fetched: u32,
    /// Index of the page that came back empty.
    pub stopped_at: u32,
}

/// Fetches increasing page indices and accumulates their records.
pub struct Paginator<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn Extractor,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, extractor: &'a dyn Extractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Run from `start` until a page yields no records.
    ///
    /// A fetch error aborts the run and discards what was accumulated; a
    /// malformed envelope counts as an empty page. Running past the last
    /// representable page index is an `INVALID_INPUT` error. Records are not
    /// deduplicated across pages.
    pub async fn drive(&self, start: u32) -> Result<Vec<JobRecord>, Error> {
        Ok(self.run(start).await?.records)
    }

    /// Like [`drive`](Self::drive), with page counts.
    pub async fn run(&self, start: u32) -> Result<PageRun, Error> {
        let mut records = Vec::new();
        let mut page = start;
        let mut pages_fetched = 0u32;

        loop {
            let body = self.fetcher.fetch_page(page).await?;
            pages_fetched += 1;

            let label = format!("page {page}");
            let found = extract_or_skip(self.extractor, &label, &body);
            if found.is_empty() {
                tracing::info!(page, total = records.len(), "empty page, stopping");
                break;
            }

            tracing::info!(page, count = found.len(), "extracted job records");
            records.extend(found);
            page = page
                .checked_add(1)
                .ok_or_else(|| Error::InvalidInput(format!("page index overflow after page {page}")))?;
        }

        Ok(PageRun { records, pages_fetched, stopped_at: page })
    }
}
