//! HTTP client with connection pooling and opt-in retries

use provaudit_config::NetworkConfig;
use provaudit_errors::{Error, NetworkError};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Per-request timeout; expiry surfaces as `NetworkError::Timeout`
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry_count: 0,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("provaudit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            retry_count: config.retries,
            retry_delay: config.retry_delay(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// GET `url`, retrying connection failures and 5xx responses up to
    /// `retry_count` times
    ///
    /// A timeout is never retried. Attempts are spaced linearly by
    /// `retry_delay`, and any other status is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::RateLimited` for a 429 that carries
    /// `Retry-After`, `NetworkError::Timeout` on the first timeout, and a
    /// connection or download error once the retries are exhausted.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let mut attempt = 0;
        loop {
            let outcome = self.client.get(url).send().await;
            let retryable = match &outcome {
                Ok(response) => response.status().is_server_error(),
                Err(e) => !e.is_timeout() && (e.is_connect() || e.is_request()),
            };

            if !retryable || attempt >= self.config.retry_count {
                return match outcome {
                    Ok(response) => check_rate_limit(response),
                    Err(e) => Err(transport_error(url, &e)),
                };
            }

            attempt += 1;
            tracing::debug!(url, attempt, "retrying request");
            tokio::time::sleep(self.config.retry_delay * attempt).await;
        }
    }
}

fn check_rate_limit(response: Response) -> Result<Response, Error> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return Ok(response);
    }
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    match retry_after {
        Some(seconds) => Err(NetworkError::RateLimited { seconds }.into()),
        None => Ok(response),
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(error.to_string()).into()
    } else {
        NetworkError::DownloadFailed(error.to_string()).into()
    }
}
