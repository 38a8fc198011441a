//! A single load worker

use crate::catalog::EndpointPicker;
use crate::shutdown::WorkerGuard;
use crate::stats::StatsAggregator;
use std::sync::Arc;
use std::time::Duration;
use stress_http::{FailureReason, RequestExecutor, RequestOutcome};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Extra time an executor gets past the request timeout before the worker
/// gives up on it
const EXECUTOR_GRACE: Duration = Duration::from_millis(100);

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) executor: Arc<dyn RequestExecutor>,
    pub(crate) picker: EndpointPicker,
    pub(crate) stats: Arc<StatsAggregator>,
    pub(crate) delay: watch::Receiver<Duration>,
    pub(crate) request_timeout: Duration,
    pub(crate) token: CancellationToken,
    pub(crate) guard: WorkerGuard,
}

impl Worker {
    /// Request, record, sleep, until cancelled.
    ///
    /// Cancellation is checked before each request and interrupts the
    /// sleep. A request already in flight runs to completion and is
    /// recorded.
    pub(crate) async fn run(mut self) {
        debug!(worker = self.id, "Worker started");

        let executor_bound = self.request_timeout + EXECUTOR_GRACE;
        let mut completed = 0u64;

        while !self.token.is_cancelled() {
            let endpoint = self.picker.pick();

            let outcome = match tokio::time::timeout(
                executor_bound,
                self.executor.execute(endpoint, self.request_timeout),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(
                        worker = self.id,
                        "Executor ignored the {:?} timeout for {}", self.request_timeout, endpoint
                    );
                    RequestOutcome::failure(FailureReason::Timeout)
                }
            };

            self.stats.record_outcome(&outcome);
            completed += 1;

            let delay = *self.delay.borrow();
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        debug!(worker = self.id, completed, "Worker exiting");
        drop(self.guard);
    }
}
