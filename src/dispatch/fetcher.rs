//! HTTP fetching
//!
//! The dispatcher only knows the [`HttpFetcher`] trait. [`ReqwestFetcher`] is the
//! production implementation: a blocking GET, meant to be called from a worker
//! thread, never from the async executor itself.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a fetch failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Malformed URL: {0}")]
    InvalidUrl(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Unexpected failure: {0}")]
    Other(String),
}

/// Blocking URL fetcher
pub trait HttpFetcher: Send + Sync {
    /// GET the URL and return the full response body
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking reqwest fetcher
///
/// The client is built per request inside the worker thread, so it never lives
/// on (or is dropped by) the tokio executor.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    timeout: Duration,
    user_agent: String,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(crate::config::defaults::DEFAULT_HTTP_TIMEOUT_SECS),
            crate::config::defaults::DEFAULT_USER_AGENT,
        )
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let response = client
            .get(parsed)
            .send()
            .map_err(|e| FetchError::Io(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Io(format!("Server returned status: {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Io(format!("Failed to read response body: {}", e)))?;

        debug!(bytes = body.len(), "fetched response body");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_is_rejected_before_any_io() {
        let fetcher = ReqwestFetcher::default();
        let err = fetcher.fetch("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn test_unreachable_host_is_io_failure() {
        let fetcher = ReqwestFetcher::new(Duration::from_millis(500), "test");
        // Port 9 (discard) on localhost is normally closed
        let err = fetcher.fetch("http://127.0.0.1:9/").unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    #[ignore = "Requires network access"]
    fn test_fetch_real_page() {
        let fetcher = ReqwestFetcher::default();
        let body = fetcher.fetch("https://example.com/").unwrap();
        assert!(!body.is_empty());
    }
}
