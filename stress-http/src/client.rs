//! Pooled reqwest-backed request executor

use crate::errors::HttpError;
use crate::executor::RequestExecutor;
use crate::types::{Endpoint, FailureReason, RequestOutcome};
use reqwest::Client;
use std::time::{Duration, Instant};
use stress_config::HttpConfig;
use tracing::{debug, trace};

/// Executes GET requests over a single shared connection pool.
///
/// Cloning is cheap and every clone shares the same pool, so one instance
/// serves all workers of a run.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Build an executor from HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HTTP executor with connect timeout {:?}, {} idle connections per host",
            config.connection_pool.connection_timeout, config.connection_pool.max_idle_per_host
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connection_pool.connection_timeout)
            .pool_max_idle_per_host(config.connection_pool.max_idle_per_host)
            .pool_idle_timeout(config.connection_pool.idle_timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, endpoint: &Endpoint, timeout: Duration) -> Result<u64, FailureReason> {
        let mut response = self
            .client
            .get(endpoint.url().clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        let status = response.status();

        // Drain the body even for error statuses so the connection can go back to the pool
        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(&e))? {
            bytes += chunk.len() as u64;
        }

        if status.as_u16() >= 400 {
            return Err(FailureReason::HttpStatus {
                status: status.as_u16(),
            });
        }

        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, endpoint: &Endpoint, timeout: Duration) -> RequestOutcome {
        let started = Instant::now();
        match self.fetch(endpoint, timeout).await {
            Ok(bytes) => {
                let latency = started.elapsed();
                trace!("GET {} -> {} bytes in {:?}", endpoint.url(), bytes, latency);
                RequestOutcome::success(latency, bytes)
            }
            Err(reason) => {
                trace!("GET {} failed after {:?}: {}", endpoint.url(), started.elapsed(), reason);
                RequestOutcome::failure(reason)
            }
        }
    }
}

/// Map a transport error onto the failure taxonomy
pub fn classify_error(error: &reqwest::Error) -> FailureReason {
    if error.is_timeout() {
        FailureReason::Timeout
    } else if error.is_connect() {
        FailureReason::Connection
    } else if let Some(status) = error.status() {
        FailureReason::HttpStatus {
            status: status.as_u16(),
        }
    } else {
        FailureReason::Unknown
    }
}
