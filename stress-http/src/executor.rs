//! The request execution seam between workers and the network

use crate::types::{Endpoint, RequestOutcome};
use std::time::Duration;

/// Performs one request against an endpoint and classifies the result.
///
/// Implementations must not panic and must honour `timeout`; every failure
/// is reported as [`RequestOutcome::Failure`].
#[async_trait::async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, endpoint: &Endpoint, timeout: Duration) -> RequestOutcome;
}
