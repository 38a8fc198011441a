//! Worker tracking and bounded shutdown

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, warn};

/// Slack added to the request timeout when bounding a stop
pub const STOP_GRACE: Duration = Duration::from_millis(250);

/// Counts live worker tasks
#[derive(Debug, Clone, Default)]
pub struct WorkerTracker {
    active: Arc<AtomicUsize>,
}

impl WorkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker; the count drops when the guard does
    pub fn task_started(&self) -> WorkerGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        WorkerGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn active_task_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Held by a worker for its whole lifetime, including after an abort
#[derive(Debug)]
pub struct WorkerGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Outcome of joining a set of workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub joined: usize,
    pub aborted: usize,
}

/// Join every handle before a shared deadline, aborting whatever is left.
///
/// Workers must already have been told to stop. Returns only once every
/// task has exited, aborted ones included.
pub async fn join_within(handles: Vec<JoinHandle<()>>, bound: Duration) -> JoinSummary {
    let deadline = Instant::now() + bound;
    let mut summary = JoinSummary::default();

    for mut handle in handles {
        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(())) => summary.joined += 1,
            Ok(Err(e)) => {
                if e.is_panic() {
                    error!("Worker panicked during shutdown: {}", e);
                }
                summary.joined += 1;
            }
            Err(_) => {
                handle.abort();
                // Resolves once the task is dropped, which may wait for a
                // thread-blocking poll to return
                let _ = handle.await;
                summary.aborted += 1;
            }
        }
    }

    if summary.aborted > 0 {
        warn!(
            "Aborted {} worker(s) still running after {:?}",
            summary.aborted, bound
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_guard_tracks_active_workers() {
        let tracker = WorkerTracker::new();
        let first = tracker.task_started();
        let second = tracker.task_started();
        assert_eq!(tracker.active_task_count(), 2);

        drop(first);
        assert_eq!(tracker.active_task_count(), 1);
        drop(second);
        assert_eq!(tracker.active_task_count(), 0);
    }

    #[tokio::test]
    async fn test_cooperative_workers_are_joined() {
        let tracker = WorkerTracker::new();
        let token = CancellationToken::new();

        let handles = (0..5)
            .map(|_| {
                let guard = tracker.task_started();
                let token = token.clone();
                tokio::spawn(async move {
                    let _guard = guard;
                    token.cancelled().await;
                })
            })
            .collect();

        token.cancel();
        let summary = join_within(handles, Duration::from_secs(1)).await;

        assert_eq!(summary, JoinSummary { joined: 5, aborted: 0 });
        assert_eq!(tracker.active_task_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stragglers_are_aborted_at_deadline() {
        let tracker = WorkerTracker::new();

        let stuck = {
            let guard = tracker.task_started();
            tokio::spawn(async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(3600)).await;
            })
        };
        let quick = tokio::spawn(async {});

        let started = Instant::now();
        let summary = join_within(vec![quick, stuck], Duration::from_millis(300)).await;

        assert_eq!(summary, JoinSummary { joined: 1, aborted: 1 });
        assert!(started.elapsed() <= Duration::from_millis(350));
        assert_eq!(tracker.active_task_count(), 0);
    }
}
