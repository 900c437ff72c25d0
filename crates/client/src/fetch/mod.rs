//! reqwest-backed implementation of the core fetcher contract.
//!
//! Canonicalizes the URI, sends a GET with the caller's extra headers, and
//! buffers the body while enforcing the configured size cap. Any HTTP
//! response that arrives is returned as-is, success or not; only failures
//! that produce no response at all become errors.

use async_trait::async_trait;
use reqwest::{Client, header};
use snapvault_core::{Error, FetchedResponse, Fetcher, RequestOptions};
use std::time::Duration;

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "snapvault/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "snapvault/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
            max_redirects: 5,
        }
    }
}

/// Error type for URI canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Canonicalize a URI before fetching.
///
/// The core treats URI strings as opaque keys, so consistent cache hits
/// depend on callers normalizing before calling in: trim whitespace,
/// default the scheme to https, lowercase the host, drop any fragment.
/// Query strings pass through untouched.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut parsed = url::Url::parse(&with_scheme).map_err(|e| UrlError::Invalid(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed.set_host(Some(&lowered)).map_err(|e| UrlError::Invalid(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// HTTP fetcher with size and timeout limits.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed {
                reason: format!("failed to build HTTP client: {e}"),
                response: None,
            })?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &str, options: &RequestOptions) -> Result<FetchedResponse, Error> {
        let url = canonicalize(uri).map_err(|e| Error::FetchFailed { reason: e.to_string(), response: None })?;

        let mut request = self.http.get(url.as_str());
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| Error::FetchFailed {
            reason: format!("network error: {e}"),
            response: None,
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchFailed {
                reason: format!("{len} bytes exceeds {}", self.config.max_bytes),
                response: None,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(|e| Error::FetchFailed {
            reason: format!("failed to read response: {e}"),
            response: None,
        })?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchFailed {
                reason: format!("{} bytes exceeds {}", body.len(), self.config.max_bytes),
                response: None,
            });
        }

        tracing::debug!(%url, %final_url, status, bytes = body.len(), "fetched");

        Ok(FetchedResponse { uri: final_url.to_string(), status, content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "snapvault/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20_000));
        assert_eq!(config.max_redirects, 5);
    }

    #[tokio::test]
    async fn test_fetcher_new() {
        let fetcher = HttpFetcher::new(FetchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Path");
    }

    #[test]
    fn test_canonicalize_drops_fragment_keeps_query() {
        let url = canonicalize("https://example.com/p?a=1&b=2#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_canonicalize_trims_whitespace() {
        let url = canonicalize("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalize_rejects_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }
}
