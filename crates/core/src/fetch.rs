//! Fetcher collaborator interface.
//!
//! The core never talks to the network directly; fetch-through caching
//! invokes a [`Fetcher`] supplied by the caller. Response bodies are
//! `bytes::Bytes`, so duplicating a body for persist-and-return is a cheap
//! reference-counted clone rather than a second read of a one-shot stream.

use crate::Error;
use async_trait::async_trait;
use bytes::Bytes;

/// Options forwarded verbatim to the fetcher.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
}

/// A retrieved response, buffered and ready for storage or hand-back.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// Final URI after any redirects.
    pub uri: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if present.
    pub content_type: Option<String>,
    /// Response body. Clone the response (or the body) to obtain an
    /// independently consumable copy.
    pub body: Bytes,
}

impl FetchedResponse {
    /// Whether the status is in the 2xx success range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// External content retriever.
///
/// Implementations return `Ok` for any response they actually obtained,
/// success or not; [`Error::FetchFailed`] is reserved for failures that
/// produced no response at all (transport errors, invalid URIs, oversized
/// bodies). The caller decides what to do with non-success statuses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, uri: &str, options: &RequestOptions) -> Result<FetchedResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_range() {
        let mut response =
            FetchedResponse { uri: "u".into(), status: 200, content_type: None, body: Bytes::from_static(b"x") };
        assert!(response.ok());
        response.status = 204;
        assert!(response.ok());
        response.status = 301;
        assert!(!response.ok());
        response.status = 404;
        assert!(!response.ok());
    }

    #[test]
    fn test_body_clone_is_independent() {
        let response = FetchedResponse {
            uri: "u".into(),
            status: 200,
            content_type: Some("text/plain".into()),
            body: Bytes::from_static(b"shared"),
        };
        let copy = response.clone();
        drop(response);
        assert_eq!(&copy.body[..], b"shared");
    }
}
