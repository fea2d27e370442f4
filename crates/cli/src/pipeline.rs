//! The three runnable pipelines, each a straight sequence of awaits.

use anyhow::{Context, Result};
use jobscrape_client::extract::{self, Extractor, TextScanner, extract_batch, find_single};
use jobscrape_client::fetch::header_map;
use jobscrape_client::news::{collect_topics, write_topics};
use jobscrape_client::{CachedFetcher, FetchClient, FetchConfig, JobListingFetcher, PageRun, Paginator};
use jobscrape_core::config::SinkKind;
use jobscrape_core::{
    AppConfig, ContentCache, FsStore, JobRecord, JsonFileSink, KeyValueStore, PageDb, Persisted, RecordSink, SqliteSink,
};

async fn open_sink(config: &AppConfig) -> Result<Box<dyn RecordSink>> {
    Ok(match config.sink {
        SinkKind::Json => Box::new(JsonFileSink::new(config.json_path.clone())),
        SinkKind::Sqlite => Box::new(
            SqliteSink::open(&config.db_path, &config.table)
                .await
                .with_context(|| format!("opening {}", config.db_path.display()))?,
        ),
    })
}

async fn persist(config: &AppConfig, records: &[JobRecord]) -> Result<()> {
    let sink = open_sink(config).await?;
    let outcome = sink.persist(records).await?;
    if let Persisted::Committed { rows } = outcome {
        tracing::debug!(sink = sink.name(), rows, "records persisted");
    }
    Ok(())
}

async fn open_page_db(path: &std::path::Path) -> Result<PageDb> {
    PageDb::open(path).await.with_context(|| format!("opening page store {}", path.display()))
}

async fn paginate<S: KeyValueStore>(
    fetcher: JobListingFetcher, store: S, extractor: &dyn Extractor, start: u32,
) -> Result<PageRun> {
    let cached = CachedFetcher::new(fetcher, ContentCache::new(store));
    Paginator::new(&cached, extractor).run(start).await.context("paginating job listings")
}

/// Page through the endpoint via the content cache, extract, and persist.
pub async fn run_jobs(config: &AppConfig) -> Result<()> {
    let client = FetchClient::new(FetchConfig::from(config))?;
    let headers = header_map(&config.headers)?;
    let fetcher = JobListingFetcher::new(client, config.endpoint.as_str(), headers, config.request_template.clone());
    let extractor = extract::from_config(config)?;

    let run = match &config.cache_db {
        Some(path) => paginate(fetcher, open_page_db(path).await?, extractor.as_ref(), config.start_page).await?,
        None => {
            let store = FsStore::new(config.cache_dir.clone());
            paginate(fetcher, store, extractor.as_ref(), config.start_page).await?
        }
    };
    tracing::info!(
        records = run.records.len(),
        pages = run.pages_fetched,
        stopped_at = run.stopped_at,
        strategy = extractor.name(),
        "pagination finished"
    );

    persist(config, &run.records).await
}

/// Re-extract every cached page in key order and persist, with no network.
pub async fn run_rebuild(config: &AppConfig) -> Result<()> {
    let entries = match &config.cache_db {
        Some(path) => open_page_db(path).await?.entries().await?,
        None => FsStore::new(config.cache_dir.clone()).entries().await.context("reading cache directory")?,
    };
    if entries.is_empty() {
        tracing::warn!("cache is empty, nothing to rebuild");
    }

    let extractor = extract::from_config(config)?;
    let records = extract_batch(extractor.as_ref(), entries);

    persist(config, &records).await
}

/// Collect article topics from the news index and write them out.
pub async fn run_topics(config: &AppConfig) -> Result<()> {
    let client = FetchClient::new(FetchConfig::from(config))?;
    let topics = collect_topics(&client, &config.news_url, config.news_limit)
        .await
        .context("collecting news topics")?;
    write_topics(&config.topics_path, &topics).await?;
    Ok(())
}

async fn read_input(path: &std::path::Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.with_context(|| format!("reading {}", path.display()))
}

/// Report dates and e-mail addresses in a local file on stdout.
pub async fn run_scan(path: &std::path::Path) -> Result<()> {
    let doc = read_input(path).await?;
    let report = TextScanner::new()?.scan(&doc);
    tracing::info!(dates = report.dates.len(), emails = report.emails.len(), "scan finished");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print the single element matching `selector` in a local HTML file.
pub async fn run_select(path: &std::path::Path, selector: &str) -> Result<()> {
    let html = read_input(path).await?;
    let document = scraper::Html::parse_document(&html);
    let element = find_single(&document, selector)?;
    println!("{}", element.html());
    Ok(())
}
