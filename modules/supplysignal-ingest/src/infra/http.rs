//! Upstream HTTP with bounded retry.
//!
//! Attempt `n` (1-based) that fails waits `retry_delay * n` before the next
//! one. Client errors (4xx other than 429) are not retried.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use supplysignal_common::Config;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} could not be decoded: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network { .. } => true,
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            FetchError::Client(_) | FetchError::Decode { .. } => false,
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, max_attempts: u32, retry_delay: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("supplysignal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_delay,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.http_timeout(),
            config.http_max_attempts,
            config.http_retry_delay(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// GET `url` with `query` and decode the JSON body, retrying transient
    /// failures. The last failure is returned once attempts run out.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut attempt = 1;
        loop {
            match self.get_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    let backoff = self.retry_delay * attempt;
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Upstream request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, bytes = body.len(), "Upstream response received");
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
