//! News topic scraper.
//!
//! Visits the articles linked from a sports index page and records the
//! topic tags shown on each article.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use jobscrape_core::Error;

use crate::fetch::{FetchClient, canonicalize, resolve};

const ARTICLE_CONTAINER: &str = r#"div[type="article"]"#;
const TOPIC_ITEMS: &str = r#"div[data-component="topic-list"] ul[role="list"] li"#;

/// Topics attached to one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTopics {
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Topics")]
    pub topics: Vec<String>,
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::InvalidInput(format!("invalid selector {css:?}: {e}")))
}

/// Absolute links of the first `limit` article cards on an index page.
///
/// Each card contributes the first `a[href]` inside it. Cards without a
/// usable link are skipped and do not count toward `limit`.
pub fn article_links(html: &str, base: &Url, limit: usize) -> Result<Vec<Url>, Error> {
    let document = Html::parse_document(html);
    let container = selector(ARTICLE_CONTAINER)?;
    let anchor = selector("a[href]")?;

    let mut links = Vec::new();
    for card in document.select(&container) {
        if links.len() == limit {
            break;
        }
        let Some(href) = card.select(&anchor).next().and_then(|a| a.value().attr("href")) else {
            continue;
        };
        match resolve(base, href) {
            Ok(url) => links.push(url),
            Err(e) => tracing::debug!(href, error = %e, "skipping article link"),
        }
    }

    Ok(links)
}

/// Topic labels listed on an article page, in page order.
///
/// Returns `None` when the page has no topic list at all.
pub fn article_topics(html: &str) -> Result<Option<Vec<String>>, Error> {
    let document = Html::parse_document(html);
    let panel = selector(r#"div[data-component="topic-list"]"#)?;
    if document.select(&panel).next().is_none() {
        return Ok(None);
    }

    let items = selector(TOPIC_ITEMS)?;
    let topics = document
        .select(&items)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    Ok(Some(topics))
}

/// Fetch the index page, then every linked article, collecting topics.
///
/// A failed index fetch is an error. A failed article fetch or an article
/// without a topic list is logged and recorded with no topics.
pub async fn collect_topics(client: &FetchClient, index_url: &str, limit: usize) -> Result<Vec<ArticleTopics>, Error> {
    let index = client.get(index_url).await?;
    let base = canonicalize(index.final_url.as_str()).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let links = article_links(&index.body, &base, limit)?;

    let mut results = Vec::with_capacity(links.len());
    for link in links {
        tracing::info!(%link, "requesting article");
        let topics = match client.get(link.as_str()).await {
            Ok(page) => article_topics(&page.body)?.unwrap_or_else(|| {
                tracing::warn!(%link, "article has no topic list");
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!(%link, error = %e, "article fetch failed");
                Vec::new()
            }
        };
        results.push(ArticleTopics { link: link.to_string(), topics });
    }

    Ok(results)
}

/// Write results as pretty-printed UTF-8 JSON, replacing the file.
pub async fn write_topics(path: &std::path::Path, topics: &[ArticleTopics]) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(topics)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), articles = topics.len(), "news topics written");
    Ok(())
}
