//! Free-text and single-element lookups over arbitrary documents.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use jobscrape_core::Error;

const DATE_PATTERN: &str = r"(?x)
    \b(?:
        \d{2}[/-]\d{2}[/-]\d{4}             # MM/DD/YYYY or MM-DD-YYYY
      | \d{4}[./]\d{2}[./]\d{2}             # YYYY.MM.DD or YYYY/MM/DD
      | (?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?
          |Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)
        \s\d{1,2},\s\d{4}                   # Month D, YYYY
    )\b";

const EMAIL_PATTERN: &str = r"(?x)
    [a-zA-Z0-9._%+-]+       # local part
    @
    [a-zA-Z0-9.-]+          # domain
    \.[a-zA-Z]{2,}          # top-level domain";

/// Dates and e-mail addresses found in one document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub dates: Vec<String>,
    pub emails: Vec<String>,
}

/// Regex scanner for dates and e-mail addresses in free text.
#[derive(Debug, Clone)]
pub struct TextScanner {
    dates: Regex,
    emails: Regex,
}

impl TextScanner {
    pub fn new() -> Result<Self, Error> {
        let compile = |p: &str| Regex::new(p).map_err(|e| Error::InvalidInput(format!("invalid scan pattern: {e}")));
        Ok(Self { dates: compile(DATE_PATTERN)?, emails: compile(EMAIL_PATTERN)? })
    }

    /// Dates written as `MM/DD/YYYY`, `MM-DD-YYYY`, `YYYY.MM.DD`,
    /// `YYYY/MM/DD` or `Month D, YYYY` (full or three-letter month).
    pub fn dates(&self, doc: &str) -> Vec<String> {
        self.dates.find_iter(doc).map(|m| m.as_str().to_string()).collect()
    }

    pub fn emails(&self, doc: &str) -> Vec<String> {
        self.emails.find_iter(doc).map(|m| m.as_str().to_string()).collect()
    }

    pub fn scan(&self, doc: &str) -> ScanReport {
        ScanReport { dates: self.dates(doc), emails: self.emails(doc) }
    }
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::InvalidInput(format!("invalid selector {css:?}: {e}")))
}

/// Every element matching `css`, in document order.
pub fn find_all<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>, Error> {
    let selector = selector(css)?;
    Ok(document.select(&selector).collect())
}

/// The one element matching `css`. Zero or several matches is an
/// `ELEMENT_COUNT` error carrying the count.
pub fn find_single<'a>(document: &'a Html, css: &str) -> Result<ElementRef<'a>, Error> {
    let mut found = find_all(document, css)?;
    if found.len() != 1 {
        return Err(Error::ElementCount { selector: css.to_string(), found: found.len() });
    }
    found.pop().ok_or_else(|| Error::ElementCount { selector: css.to_string(), found: 0 })
}
