//! Job record extraction from listing responses.
//!
//! ### Envelope
//! - A listing response is a JSON object; one string field (default
//!   `template`) holds the HTML fragment with the job cards.
//! - A body that is not such an object is a per-input error: batch callers
//!   log it and move on.
//!
//! ### Strategies
//! - [`StructuralExtractor`]: parse the fragment and walk it with CSS selectors.
//! - [`PatternExtractor`]: a container regex, then one multi-group regex
//!   inside each container.
//!
//! Both yield records in source order, decode text with the same HTML
//! parser, and skip an incomplete container with a warning.

pub mod pattern;
pub mod scan;
pub mod structural;
pub mod text;

pub use pattern::{DEFAULT_CONTAINER_PATTERN, DEFAULT_JOB_PATTERN, PatternExtractor};
pub use scan::{ScanReport, TextScanner, find_all, find_single};
pub use structural::StructuralExtractor;

use jobscrape_core::config::Strategy;
use jobscrape_core::{AppConfig, Error, JobRecord};
use serde_json::Value;

/// Pull the markup fragment out of a response envelope.
pub fn unwrap_envelope(body: &str, field: &str) -> Result<String, Error> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| Error::MalformedEnvelope(format!("body is not JSON: {e}")))?;

    match value.get(field) {
        Some(Value::String(markup)) => Ok(markup.clone()),
        Some(other) => Err(Error::MalformedEnvelope(format!("field `{field}` is not a string but {}", kind(other)))),
        None => Err(Error::MalformedEnvelope(format!("missing field `{field}`"))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turns one response body into job records.
pub trait Extractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Envelope field holding the markup.
    fn envelope_field(&self) -> &str;

    /// Extract from an already unwrapped markup fragment.
    fn extract_markup(&self, markup: &str) -> Vec<JobRecord>;

    /// Unwrap the envelope and extract.
    fn extract(&self, body: &str) -> Result<Vec<JobRecord>, Error> {
        let markup = unwrap_envelope(body, self.envelope_field())?;
        Ok(self.extract_markup(&markup))
    }
}

/// Build the extractor selected by `config.strategy`.
pub fn from_config(config: &AppConfig) -> Result<Box<dyn Extractor>, Error> {
    Ok(match config.strategy {
        Strategy::Structural => Box::new(StructuralExtractor::from_config(config)?),
        Strategy::Pattern => Box::new(PatternExtractor::from_config(config)?),
    })
}

/// Extract from a single input, logging and returning nothing when the
/// envelope is malformed.
pub fn extract_or_skip(extractor: &dyn Extractor, label: &str, body: &str) -> Vec<JobRecord> {
    match extractor.extract(body) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(input = label, extractor = extractor.name(), error = %e, "failed to process input");
            Vec::new()
        }
    }
}

/// Extract from every `(label, body)` input and concatenate the results.
///
/// Malformed inputs are skipped with a warning; the batch never fails.
pub fn extract_batch<L, B>(extractor: &dyn Extractor, inputs: impl IntoIterator<Item = (L, B)>) -> Vec<JobRecord>
where
    L: AsRef<str>,
    B: AsRef<str>,
{
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (label, body) in inputs {
        match extractor.extract(body.as_ref()) {
            Ok(found) => records.extend(found),
            Err(e) => {
                skipped += 1;
                tracing::warn!(input = label.as_ref(), extractor = extractor.name(), error = %e, "failed to process input");
            }
        }
    }

    tracing::info!(records = records.len(), skipped, "batch extraction finished");
    records
}


#[cfg(test)]
mod tests {
    use super::fixtures::{IRREGULAR, WELL_FORMED, envelope, expected_records, irregular_records};
    use super::*;

    #[test]
    fn test_unwrap_envelope() {
        let markup = unwrap_envelope(&envelope("<article></article>"), "template").unwrap();
        assert_eq!(markup, "<article></article>");
    }

    #[test]
    fn test_unwrap_envelope_errors() {
        assert!(matches!(unwrap_envelope("<html>", "template"), Err(Error::MalformedEnvelope(_))));
        assert!(matches!(unwrap_envelope("{}", "template"), Err(Error::MalformedEnvelope(_))));
        assert!(matches!(unwrap_envelope(r#"{"template": 3}"#, "template"), Err(Error::MalformedEnvelope(_))));
        assert!(matches!(unwrap_envelope("[]", "template"), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn test_strategies_agree() {
        let config = AppConfig::default();
        let structural = StructuralExtractor::from_config(&config).unwrap();
        let pattern = PatternExtractor::from_config(&config).unwrap();
        let body = envelope(WELL_FORMED);

        let by_tree = structural.extract(&body).unwrap();
        let by_pattern = pattern.extract(&body).unwrap();

        assert_eq!(by_tree, by_pattern);
        assert_eq!(by_tree, expected_records());
    }

    #[test]
    fn test_strategies_agree_on_irregular_cards() {
        let config = AppConfig::default();
        let structural = StructuralExtractor::from_config(&config).unwrap();
        let pattern = PatternExtractor::from_config(&config).unwrap();
        let body = envelope(IRREGULAR);

        let by_tree = structural.extract(&body).unwrap();
        let by_pattern = pattern.extract(&body).unwrap();

        assert_eq!(by_tree, irregular_records());
        assert_eq!(by_pattern, by_tree);
    }

    #[test]
    fn test_from_config_selects_strategy() {
        let structural = from_config(&AppConfig::default()).unwrap();
        assert_eq!(structural.name(), "structural");

        let config = AppConfig { strategy: Strategy::Pattern, ..Default::default() };
        assert_eq!(from_config(&config).unwrap().name(), "pattern");
    }

    #[test]
    fn test_from_config_custom_envelope_field() {
        let config = AppConfig { envelope_field: "html".into(), ..Default::default() };
        let extractor = from_config(&config).unwrap();
        let body = serde_json::json!({ "html": WELL_FORMED }).to_string();

        assert_eq!(extractor.extract(&body).unwrap().len(), 3);
    }

    #[test]
    fn test_batch_skips_malformed_envelope() {
        let config = AppConfig::default();
        for extractor in [from_config(&config).unwrap(), {
            let config = AppConfig { strategy: Strategy::Pattern, ..Default::default() };
            from_config(&config).unwrap()
        }] {
            let inputs = vec![
                ("good-1", envelope(WELL_FORMED)),
                ("no-template", r#"{"settings": {}}"#.to_string()),
                ("not-json", "<!doctype html><p>502 Bad Gateway</p>".to_string()),
                ("good-2", envelope(WELL_FORMED)),
            ];

            let records = extract_batch(extractor.as_ref(), inputs);

            assert_eq!(records.len(), 6);
            assert_eq!(&records[..3], expected_records().as_slice());
        }
    }

    #[test]
    fn test_extract_or_skip_missing_field_yields_nothing() {
        let extractor = from_config(&AppConfig::default()).unwrap();
        assert!(extract_or_skip(extractor.as_ref(), "page-0", r#"{"data": 1}"#).is_empty());
        assert_eq!(extract_or_skip(extractor.as_ref(), "page-1", &envelope(WELL_FORMED)).len(), 3);
    }
}
