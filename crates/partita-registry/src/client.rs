//! HTTP client with retry logic and request statistics.

use crate::error::{RegistryError, Result};
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum retries for transient failures.
    pub max_retries: usize,
    /// Initial retry delay.
    pub retry_delay: Duration,
    /// Maximum retry delay.
    pub max_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(5),
            user_agent: format!("Partita/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client statistics.
#[derive(Debug, Default)]
pub struct HttpClientStats {
    /// Total requests made.
    pub requests: AtomicU64,
    /// Successful requests (2xx).
    pub successes: AtomicU64,
    /// Client errors (4xx).
    pub client_errors: AtomicU64,
    /// Server errors (5xx).
    pub server_errors: AtomicU64,
    /// Retries attempted.
    pub retries: AtomicU64,
    /// Total bytes received.
    pub bytes_received: AtomicU64,
}

impl HttpClientStats {
    /// Create a new stats tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Success rate as a percentage.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.requests.load(Ordering::Relaxed);
        let success = self.successes.load(Ordering::Relaxed);
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }
}

/// HTTP client shared by all registry backends.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    stats: Arc<HttpClientStats>,
}

impl HttpClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| RegistryError::InvalidConfig {
                    message: "invalid user agent".into(),
                })?,
        );
        headers.insert(
            header::ACCEPT,
            "application/json"
                .parse()
                .map_err(|_| RegistryError::InvalidConfig {
                    message: "invalid accept header".into(),
                })?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(|e| RegistryError::InvalidConfig {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(HttpClientStats::new()),
        })
    }

    /// Perform a GET request with retry on transient failures.
    ///
    /// # Errors
    /// Returns an error if the request fails after all retries, or the
    /// server responds with a non-2xx status.
    pub async fn get(&self, url: &Url) -> Result<bytes::Bytes> {
        let url_str = url.to_string();
        let stats = &self.stats;

        let body = (|| async {
            stats.requests.fetch_add(1, Ordering::Relaxed);
            debug!(url = %url_str, "GET");

            let result = self.client.get(url.clone()).send().await;
            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        stats.successes.fetch_add(1, Ordering::Relaxed);
                        let body =
                            resp.bytes()
                                .await
                                .map_err(|e| RegistryError::Network {
                                    url: url_str.clone(),
                                    message: format!("failed to read body: {e}"),
                                    status: None,
                                })?;
                        stats
                            .bytes_received
                            .fetch_add(body.len() as u64, Ordering::Relaxed);
                        Ok(body)
                    } else if status == StatusCode::NOT_FOUND {
                        stats.client_errors.fetch_add(1, Ordering::Relaxed);
                        Err(RegistryError::Network {
                            url: url_str.clone(),
                            message: "not found".into(),
                            status: Some(404),
                        })
                    } else if status.is_client_error() {
                        stats.client_errors.fetch_add(1, Ordering::Relaxed);
                        Err(RegistryError::Network {
                            url: url_str.clone(),
                            message: format!("client error: {status}"),
                            status: Some(status.as_u16()),
                        })
                    } else {
                        stats.server_errors.fetch_add(1, Ordering::Relaxed);
                        Err(RegistryError::Network {
                            url: url_str.clone(),
                            message: format!("server error: {status}"),
                            status: Some(status.as_u16()),
                        })
                    }
                }
                Err(e) => Err(RegistryError::Network {
                    url: url_str.clone(),
                    message: e.to_string(),
                    status: None,
                }),
            }
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(self.config.retry_delay)
                .with_max_delay(self.config.max_retry_delay)
                .with_max_times(self.config.max_retries),
        )
        .when(RegistryError::is_transient)
        .notify(|err, dur| {
            stats.retries.fetch_add(1, Ordering::Relaxed);
            warn!(error = %err, retry_in = ?dur, "retrying request");
        })
        .await?;

        Ok(body)
    }

    /// Perform a GET request and decode the JSON body.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body is not valid JSON
    /// for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.get(url).await?;
        serde_json::from_slice(&body).map_err(|e| RegistryError::Network {
            url: url.to_string(),
            message: format!("invalid JSON response: {e}"),
            status: None,
        })
    }

    /// Client statistics.
    #[must_use]
    pub fn stats(&self) -> &HttpClientStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn stats_success_rate() {
        let stats = HttpClientStats::new();
        stats.requests.store(10, Ordering::Relaxed);
        stats.successes.store(9, Ordering::Relaxed);
        assert!((stats.success_rate() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = RegistryError::Network {
            url: "https://example.com".into(),
            message: "not found".into(),
            status: Some(404),
        };
        assert!(!err.is_transient());

        let err = RegistryError::Network {
            url: "https://example.com".into(),
            message: "server error".into(),
            status: Some(503),
        };
        assert!(err.is_transient());
    }
}
