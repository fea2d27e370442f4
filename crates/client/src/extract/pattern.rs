//! Pattern extraction over raw markup text.
//!
//! Two regexes: one delimits each job container, the other reads the
//! `(id, href, title)` triple inside a single container. A match can never
//! reach into the next card, so an incomplete card is skipped exactly as
//! the structural strategy skips it.

use regex::Regex;

use jobscrape_core::config::JOB_PATTERN_GROUPS;
use jobscrape_core::{AppConfig, Error, JobRecord};

use super::Extractor;
use super::text::{attribute_text, collapse_whitespace, markup_text};

/// One match per `<article>` element, up to its first closing tag.
pub const DEFAULT_CONTAINER_PATTERN: &str = r"(?s)<article\b[^>]*>.*?</article>";

/// Reads the `data-job-id` attribute, then the first `href` on an `<a>`,
/// then the `jobCard_title` heading, in that order.
pub const DEFAULT_JOB_PATTERN: &str = r#"(?s)\bdata-job-id="(?P<id>[^"]*)".*?<a\b[^>]*?\bhref="(?P<href>[^"]*)".*?<h3\b[^>]*?\bclass="[^"]*\bjobCard_title\b[^"]*"[^>]*>(?P<title>.*?)</h3>"#;

fn compile(what: &str, pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::InvalidInput(format!("invalid {what} pattern: {e}")))
}

/// Pulls (id, href, title) triples with regexes, without building a tree.
///
/// The job pattern must define the named groups `id`, `href` and `title`;
/// the first match inside each container is used. `id` and `href` are
/// decoded as attribute values, `title` has its tags dropped and whitespace
/// collapsed, so output matches [`StructuralExtractor`](super::StructuralExtractor)
/// on well-formed cards. The parts must appear in pattern order; a card laid
/// out differently is reported as incomplete.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    envelope_field: String,
    container: Regex,
    job: Regex,
}

impl PatternExtractor {
    pub fn new(envelope_field: impl Into<String>, container: &str, job: &str) -> Result<Self, Error> {
        let container = compile("container", container)?;
        let job = compile("job", job)?;

        for group in JOB_PATTERN_GROUPS {
            if !job.capture_names().flatten().any(|name| name == group) {
                return Err(Error::InvalidInput(format!("job pattern lacks named group `{group}`")));
            }
        }

        Ok(Self { envelope_field: envelope_field.into(), container, job })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(
            config.envelope_field.as_str(),
            config.container_pattern.as_deref().unwrap_or(DEFAULT_CONTAINER_PATTERN),
            config.job_pattern.as_deref().unwrap_or(DEFAULT_JOB_PATTERN),
        )
    }

    fn read_container(&self, container: &str) -> Result<JobRecord, Error> {
        let caps = self
            .job
            .captures(container)
            .ok_or_else(|| Error::MalformedContainer("no id, link and title in pattern order".to_string()))?;
        let group = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

        Ok(JobRecord::new(
            attribute_text(group("id")),
            collapse_whitespace(&markup_text(group("title"))),
            attribute_text(group("href")),
        ))
    }
}

impl Extractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn envelope_field(&self) -> &str {
        &self.envelope_field
    }

    fn extract_markup(&self, markup: &str) -> Vec<JobRecord> {
        let mut records = Vec::new();

        for (index, container) in self.container.find_iter(markup).enumerate() {
            match self.read_container(container.as_str()) {
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

    fn extractor() -> PatternExtractor {
        PatternExtractor::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_records_in_order() {
        let records = extractor().extract(&envelope(WELL_FORMED)).unwrap();
        assert_eq!(records, expected_records());
    }

    #[test]
    fn test_card_spanning_lines() {
        let markup = "<article class=\"jobCard\">\n  <div\n    data-job-id=\"77\">\n    <a class=\"x\"\n       href=\"/emplois/77\">\n      <h3 class=\"jobCard_title\">\n        Opérateur\n        de production\n      </h3>\n    </a>\n  </div>\n</article>";

        let records = extractor().extract_markup(markup);

        assert_eq!(records, vec![JobRecord::new("77", "Opérateur de production", "/emplois/77")]);
    }

    #[test]
    fn test_card_without_title_does_not_borrow_next_title() {
        let markup = r#"<article><div data-job-id="1"><a href="/1">One</a></div></article><article><div data-job-id="2"><a href="/2"><h3 class="jobCard_title">Two</h3></a></div></article>"#;

        let records = extractor().extract_markup(markup);

        assert_eq!(records, vec![JobRecord::new("2", "Two", "/2")]);
    }

    #[test]
    fn test_nested_title_markup() {
        let markup = r#"<article><div data-job-id="9"><a href="/9"><h3 class="jobCard_title">Cariste <strong>CDI</strong></h3></a></div></article>"#;

        let records = extractor().extract_markup(markup);

        assert_eq!(records, vec![JobRecord::new("9", "Cariste CDI", "/9")]);
    }

    #[test]
    fn test_custom_patterns() {
        let extractor =
            PatternExtractor::new("template", r"(?m)^.+$", r"^(?P<id>\d+)\|(?P<href>[^|]+)\|(?P<title>.+)$").unwrap();

        let records = extractor.extract_markup("1|/a|Alpha\nnot a record\n2|/b|Beta &amp; Co");

        assert_eq!(records, vec![JobRecord::new("1", "Alpha", "/a"), JobRecord::new("2", "Beta & Co", "/b")]);
    }

    #[test]
    fn test_rejects_bad_patterns() {
        let result = PatternExtractor::new("template", DEFAULT_CONTAINER_PATTERN, r"(?P<id>\d+)");
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = PatternExtractor::new("template", DEFAULT_CONTAINER_PATTERN, "(unclosed");
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = PatternExtractor::new("template", "(unclosed", DEFAULT_JOB_PATTERN);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_missing_envelope_field_is_error() {
        let result = extractor().extract(r#"{"data": {}}"#);
        assert!(matches!(result, Err(Error::MalformedEnvelope(_))));
    }
}
