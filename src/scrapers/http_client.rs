//! HTTP client for fetching marketplace pages.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Default user agent for requests.
///
/// The marketplace rejects default library client identities, so we present
/// a realistic desktop browser string.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// A classified fetch failure.
///
/// Callers must treat any variant as "no data", never as an empty page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected HTTP status: {0}")]
    Http(u16),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// HTTP client with a fixed identity and timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the default user agent and timeout.
    pub fn new() -> Self {
        Self::with_user_agent(USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP client with a custom user agent and timeout.
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch a page body as text.
    ///
    /// Any non-200 response or transport error is a [`FetchError`]; a
    /// partial or garbage body is never returned as success.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(FetchError::Http(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
