//! Text cleanup shared by both extraction strategies.
//!
//! Decoding goes through the same HTML parser the structural strategy uses,
//! so character references and nested tags come out identically whichever
//! strategy found the raw text.

use scraper::{ElementRef, Html};

const CARRIER_ATTR: &str = "data-raw";

/// Collapse runs of whitespace to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode raw attribute-value text as the parser would inside `attr="..."`.
pub fn attribute_text(raw: &str) -> String {
    let markup = format!(r#"<span {CARRIER_ATTR}="{}"></span>"#, raw.replace('"', "&quot;"));
    let fragment = Html::parse_fragment(&markup);

    fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|el| el.value().attr(CARRIER_ATTR).map(str::to_string))
        .unwrap_or_default()
}

/// Text content of a raw markup snippet: tags dropped, references decoded.
pub fn markup_text(raw: &str) -> String {
    Html::parse_fragment(raw).root_element().text().collect()
}
