//! Unified error types for jobscrape.
//!
//! Display strings carry an upper-case code prefix so log lines can be
//! grepped by failure class.

use tokio_rusqlite::rusqlite;

/// Unified error types for the scraping pipelines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty endpoint).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Response body is not the expected envelope, or lacks the markup field.
    #[error("MALFORMED_ENVELOPE: {0}")]
    MalformedEnvelope(String),

    /// A container element lacks one of identifier, link or title.
    #[error("MALFORMED_CONTAINER: {0}")]
    MalformedContainer(String),

    /// A lookup that must match exactly one element matched some other number.
    #[error("ELEMENT_COUNT: expected exactly one element for {selector:?}, found {found}")]
    ElementCount { selector: String, found: usize },

    /// Cache directory or output file I/O failed.
    #[error("STORAGE_ERROR: {0}")]
    Storage(#[from] std::io::Error),

    /// Database operation failed.
    #[error("DATABASE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("DATABASE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Network failure or non-success HTTP status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// JSON encoding or decoding failed.
    #[error("SERIALIZE_ERROR: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedEnvelope("missing field `template`".to_string());
        assert!(err.to_string().contains("MALFORMED_ENVELOPE"));
        assert!(err.to_string().contains("template"));
    }

    #[test]
    fn test_element_count_display() {
        let err = Error::ElementCount { selector: "input#q".into(), found: 2 };
        assert_eq!(err.to_string(), "ELEMENT_COUNT: expected exactly one element for \"input#q\", found 2");
    }

    #[test]
    fn test_io_error_is_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().starts_with("STORAGE_ERROR"));
    }

    #[test]
    fn test_rusqlite_error_is_database() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
