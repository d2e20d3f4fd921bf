//! Shared HTTP fetcher.
//!
//! Retry/backoff policy is the embedding scheduler's concern; this client
//! carries the caller-supplied timeout and user agent and maps non-2xx
//! statuses to typed errors.

use std::time::Duration;

use figtrack_core::AppConfig;

use crate::error::ScraperError;

/// Thin wrapper over a [`reqwest::Client`] configured for polite
/// scraping.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying client cannot be
    /// constructed (e.g. invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Convenience constructor from pipeline settings.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(config.request_timeout_secs, &config.user_agent)
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] — network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — any non-2xx response.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}
