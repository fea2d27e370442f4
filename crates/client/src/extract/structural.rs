//! Element-tree extraction with CSS selectors.

use scraper::{ElementRef, Html, Selector};

use jobscrape_core::{AppConfig, Error, JobRecord};

use super::Extractor;
use super::text::collapse_whitespace;

fn parse_selector(field: &str, css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::InvalidInput(format!("invalid {field} selector {css:?}: {e}")))
}

/// Walks repeating container elements and reads one identifier attribute,
/// one link and one title from each.
///
/// When a container holds several matches for a part, the first in document
/// order is used. A container lacking any part is skipped with a warning;
/// the rest of the page is still extracted.
#[derive(Debug, Clone)]
pub struct StructuralExtractor {
    envelope_field: String,
    container: Selector,
    id: Selector,
    id_attr: String,
    link: Selector,
    title: Selector,
}

impl StructuralExtractor {
    pub fn new(
        envelope_field: impl Into<String>, container: &str, id: &str, id_attr: impl Into<String>, link: &str,
        title: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            envelope_field: envelope_field.into(),
            container: parse_selector("container", container)?,
            id: parse_selector("id", id)?,
            id_attr: id_attr.into(),
            link: parse_selector("link", link)?,
            title: parse_selector("title", title)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(
            config.envelope_field.as_str(),
            &config.container_selector,
            &config.id_selector,
            config.id_attr.as_str(),
            &config.link_selector,
            &config.title_selector,
        )
    }

    fn read_container(&self, container: ElementRef<'_>) -> Result<JobRecord, Error> {
        let job_id = container
            .select(&self.id)
            .next()
            .and_then(|el| el.value().attr(&self.id_attr))
            .ok_or_else(|| Error::MalformedContainer(format!("no `{}` attribute", self.id_attr)))?;

        let href = container
            .select(&self.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .ok_or_else(|| Error::MalformedContainer("no link".to_string()))?;

        let title = container
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .ok_or_else(|| Error::MalformedContainer("no title".to_string()))?;

        Ok(JobRecord::new(job_id, title, href))
    }
}

impl Extractor for StructuralExtractor {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn envelope_field(&self) -> &str {
        &self.envelope_field
    }

    fn extract_markup(&self, markup: &str) -> Vec<JobRecord> {
        let fragment = Html::parse_fragment(markup);
        let mut records = Vec::new();

        for (index, container) in fragment.select(&self.container).enumerate() {
            match self.read_container(container) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(container = index, error = %e, "skipping job container"),
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{WELL_FORMED, envelope, expected_records};
    use super::*;

    fn extractor() -> StructuralExtractor {
        StructuralExtractor::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_records_in_order() {
        let records = extractor().extract(&envelope(WELL_FORMED)).unwrap();
        assert_eq!(records, expected_records());
    }

    #[test]
    fn test_skips_incomplete_container() {
        let markup = r#"
            <article class="jobCard">
                <div data-job-id="1"><a href="/emplois/1"><h3 class="jobCard_title">Complete</h3></a></div>
            </article>
            <article class="jobCard">
                <div data-job-id="2"><a href="/emplois/2">no title here</a></div>
            </article>
            <article class="jobCard">
                <div><a href="/emplois/3"><h3 class="jobCard_title">No id</h3></a></div>
            </article>
            <article class="jobCard">
                <div data-job-id="4"><h3 class="jobCard_title">No link</h3></div>
            </article>
        "#;

        let records = extractor().extract_markup(markup);

        assert_eq!(records, vec![JobRecord::new("1", "Complete", "/emplois/1")]);
    }

    #[test]
    fn test_first_match_wins_inside_container() {
        let markup = r#"
            <article>
                <div data-job-id="first"></div><div data-job-id="second"></div>
                <a href="/one">x</a><a href="/two">y</a>
                <h3 class="jobCard_title">One</h3><h3 class="jobCard_title">Two</h3>
            </article>
        "#;

        let records = extractor().extract_markup(markup);

        assert_eq!(records, vec![JobRecord::new("first", "One", "/one")]);
    }

    #[test]
    fn test_no_containers() {
        assert!(extractor().extract(&envelope("<p>Aucune offre</p>")).unwrap().is_empty());
        assert!(extractor().extract(&envelope("")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_envelope_field_is_error() {
        let result = extractor().extract(r#"{"html": "<article></article>"}"#);
        assert!(matches!(result, Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn test_invalid_selector() {
        let result = StructuralExtractor::new("template", "article[", "div", "data-job-id", "a", "h3");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
