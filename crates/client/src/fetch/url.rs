//! URL normalization for requests and harvested links.

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

fn check_scheme(url: &url::Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Parse a request URL.
///
/// Surrounding whitespace is trimmed, a missing scheme defaults to
/// `https://`, and the fragment is dropped. Path and query are left
/// untouched so the cache key material stays what the caller wrote.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    check_scheme(&parsed)?;
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a possibly relative `href` found on `base`.
pub fn resolve(base: &url::Url, href: &str) -> Result<url::Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = base.join(href).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    check_scheme(&joined)?;
    Ok(joined)
}
