//! Unified error types for snapvault.
//!
//! One variant per failure class; nothing is retried internally, every
//! failure surfaces synchronously to the caller of the operation that hit
//! it.

use crate::fetch::FetchedResponse;
use tokio_rusqlite::rusqlite;

/// Unified error type for the snapshot cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed digest text (wrong length or non-hex characters).
    #[error("INVALID_DIGEST: {0}")]
    InvalidDigest(String),

    /// Directory or file operation failed in blob storage.
    #[error("STORAGE_IO: {0}")]
    Storage(#[from] std::io::Error),

    /// Metadata index engine failure.
    #[error("INDEX_FAILURE: {0}")]
    Index(tokio_rusqlite::Error),

    /// Index migration failed to apply.
    #[error("INDEX_FAILURE: migration failed: {0}")]
    MigrationFailed(String),

    /// The fetcher did not produce a storable response.
    ///
    /// Carries the unsuccessful response for inspection when one exists;
    /// transport-level failures have none.
    #[error("FETCH_FAILED: {reason}")]
    FetchFailed {
        reason: String,
        response: Option<Box<FetchedResponse>>,
    },

    /// No snapshot exists or qualifies for a lookup that requires one.
    #[error("NOT_FOUND: no snapshot for {0}")]
    NotFound(String),

    /// Stored content is not valid JSON for the requested type.
    #[error("DECODE_ERROR: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Index(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Index(tokio_rusqlite::Error::Close(c)),
            _ => Error::Index(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Index(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Index(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("https://example.com".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("https://example.com"));
    }

    #[test]
    fn test_fetch_failed_display() {
        let err = Error::FetchFailed { reason: "status 503".to_string(), response: None };
        assert!(err.to_string().contains("FETCH_FAILED"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_storage_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("STORAGE_IO"));
    }
}
