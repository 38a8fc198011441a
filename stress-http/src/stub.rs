//! Offline request executor with canned outcomes

use crate::executor::RequestExecutor;
use crate::types::{Endpoint, FailureReason, RequestOutcome};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Executor that never touches the network.
///
/// Each call sleeps for the configured latency, then returns the outcome
/// mocked for the endpoint URL, falling back to the default outcome. A
/// latency longer than the request timeout yields a timeout failure after
/// sleeping for the timeout, as a real client would.
#[derive(Debug)]
pub struct StubExecutor {
    latency: Duration,
    default_outcome: RequestOutcome,
    mocks: HashMap<String, RequestOutcome>,
    calls: AtomicU64,
}

impl StubExecutor {
    /// Always succeed after `latency`, reporting `bytes` received
    pub fn success(latency: Duration, bytes: u64) -> Self {
        Self::with_outcome(latency, RequestOutcome::success(latency, bytes))
    }

    /// Always fail with `reason` after `latency`
    pub fn failing(latency: Duration, reason: FailureReason) -> Self {
        Self::with_outcome(latency, RequestOutcome::failure(reason))
    }

    pub fn with_outcome(latency: Duration, outcome: RequestOutcome) -> Self {
        Self {
            latency,
            default_outcome: outcome,
            mocks: HashMap::new(),
            calls: AtomicU64::new(0),
        }
    }

    /// Return `outcome` for requests to `url` instead of the default
    pub fn add_mock(&mut self, url: &str, outcome: RequestOutcome) {
        debug!("Added stub outcome for {}", url);
        self.mocks.insert(url.to_string(), outcome);
    }

    /// Number of requests executed so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl RequestExecutor for StubExecutor {
    async fn execute(&self, endpoint: &Endpoint, timeout: Duration) -> RequestOutcome {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if self.latency > timeout {
            tokio::time::sleep(timeout).await;
            return RequestOutcome::failure(FailureReason::Timeout);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.mocks
            .get(endpoint.url().as_str())
            .unwrap_or(&self.default_outcome)
            .clone()
    }
}
