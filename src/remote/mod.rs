//! Remote count fetching.
//!
//! [`CountFetcher`] is the seam the cache core talks through;
//! [`SharedCountClient`] is the production implementation against the
//! SharedCount HTTP API.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::ShareConfig;
use crate::count::{parse_payload, SharePayload};
use crate::error::{Result, ShareCountError};

/// Fetches per-service counts for a URL from the counting service.
pub trait CountFetcher: Send + Sync {
    /// Query counts for a page URL.
    fn fetch(&self, url: &str) -> Result<SharePayload>;
}

/// Client for the SharedCount `/url` endpoint.
pub struct SharedCountClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl SharedCountClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`ShareCountError::MissingApiKey`] when no key is set, so
    /// callers can skip fetching instead of burning requests that will be
    /// rejected.
    pub fn new(config: &ShareConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(ShareCountError::MissingApiKey);
        }
        Ok(Self::from_parts(
            config.api_domain.base_url(),
            config.api_key.trim(),
        ))
    }

    /// Build a client against an explicit endpoint, with the default
    /// 30-second timeout. Also used by tests to point at a mock server.
    pub fn from_parts(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, Duration::from_secs(30))
    }

    /// Build a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .user_agent("sharecount")
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CountFetcher for SharedCountClient {
    fn fetch(&self, url: &str) -> Result<SharePayload> {
        let endpoint = format!("{}/url", self.base_url);
        let response = self
            .client
            .get(&endpoint)
            .query(&[("url", url), ("apikey", self.api_key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareCountError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        parse_payload(&body)
    }
}
