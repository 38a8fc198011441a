//! Thread-safe run statistics

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use stress_http::{FailureReason, RequestOutcome};

/// Number of recent successful latencies kept for the summary
pub const LATENCY_WINDOW: usize = 100;

/// Smallest elapsed time used as a rate denominator
const RATE_EPSILON: Duration = Duration::from_millis(1);

/// Failure counts by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorBreakdown {
    pub timeouts: u64,
    pub connection_errors: u64,
    pub http_errors: u64,
    pub unknown_errors: u64,
}

impl ErrorBreakdown {
    pub fn total(&self) -> u64 {
        self.timeouts + self.connection_errors + self.http_errors + self.unknown_errors
    }
}

/// Latency over the most recent successful requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub samples: usize,
    #[serde(with = "humantime_serde")]
    pub average: Duration,
    #[serde(with = "humantime_serde")]
    pub median: Duration,
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

/// Point-in-time copy of the run statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub requests_per_second: f64,
    pub bytes_received: u64,
    pub errors: ErrorBreakdown,
    pub latency: Option<LatencySummary>,
    pub active_workers: usize,
}

impl StatsSnapshot {
    pub fn successful_requests(&self) -> u64 {
        self.total_requests.saturating_sub(self.total_errors)
    }

    /// Failed share of all requests, 0.0 when nothing has run
    pub fn error_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_requests as f64
        }
    }

    /// Success percentage, 100.0 when nothing has run
    pub fn success_rate_percent(&self) -> f64 {
        (1.0 - self.error_rate()) * 100.0
    }
}

#[derive(Debug, Default)]
struct RunClock {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl RunClock {
    fn elapsed(&self) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }
}

/// Counters shared by all workers of a run.
///
/// `record_outcome` is lock-free for the counters and takes a short mutex
/// only to push a latency sample. Errors are bumped after the total and read
/// before it, so a snapshot never shows more errors than requests.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    bytes_received: AtomicU64,
    timeouts: AtomicU64,
    connection_errors: AtomicU64,
    http_errors: AtomicU64,
    unknown_errors: AtomicU64,
    latencies: Mutex<VecDeque<Duration>>,
    clock: RwLock<RunClock>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter and restart the clock. Only called while no
    /// workers are running.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::SeqCst);
        self.total_errors.store(0, Ordering::SeqCst);
        self.bytes_received.store(0, Ordering::SeqCst);
        self.timeouts.store(0, Ordering::SeqCst);
        self.connection_errors.store(0, Ordering::SeqCst);
        self.http_errors.store(0, Ordering::SeqCst);
        self.unknown_errors.store(0, Ordering::SeqCst);
        self.latencies.lock().clear();

        let mut clock = self.clock.write();
        clock.started_at = Some(Instant::now());
        clock.stopped_at = None;
    }

    /// Freeze elapsed time at the end of a run
    pub fn mark_stopped(&self) {
        let mut clock = self.clock.write();
        if clock.started_at.is_some() && clock.stopped_at.is_none() {
            clock.stopped_at = Some(Instant::now());
        }
    }

    pub fn record_outcome(&self, outcome: &RequestOutcome) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        match outcome {
            RequestOutcome::Success { latency, bytes } => {
                self.bytes_received.fetch_add(*bytes, Ordering::Relaxed);

                let mut latencies = self.latencies.lock();
                if latencies.len() == LATENCY_WINDOW {
                    latencies.pop_front();
                }
                latencies.push_back(*latency);
            }
            RequestOutcome::Failure { reason } => {
                let counter = match reason {
                    FailureReason::Timeout => &self.timeouts,
                    FailureReason::Connection => &self.connection_errors,
                    FailureReason::HttpStatus { .. } => &self.http_errors,
                    FailureReason::Unknown => &self.unknown_errors,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                self.total_errors.fetch_add(1, Ordering::Release);
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total_errors = self.total_errors.load(Ordering::Acquire);
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let elapsed = self.clock.read().elapsed();

        let requests_per_second = total_requests as f64 / elapsed.max(RATE_EPSILON).as_secs_f64();

        StatsSnapshot {
            total_requests,
            total_errors,
            elapsed,
            requests_per_second,
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            errors: ErrorBreakdown {
                timeouts: self.timeouts.load(Ordering::Relaxed),
                connection_errors: self.connection_errors.load(Ordering::Relaxed),
                http_errors: self.http_errors.load(Ordering::Relaxed),
                unknown_errors: self.unknown_errors.load(Ordering::Relaxed),
            },
            latency: self.latency_summary(),
            active_workers: 0,
        }
    }

    fn latency_summary(&self) -> Option<LatencySummary> {
        let mut sorted: Vec<Duration> = self.latencies.lock().iter().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2
        };
        let total: Duration = sorted.iter().sum();

        Some(LatencySummary {
            samples: n,
            average: total / n as u32,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ok(millis: u64) -> RequestOutcome {
        RequestOutcome::success(Duration::from_millis(millis), 100)
    }

    #[test]
    fn test_snapshot_after_reset_is_zeroed() {
        let stats = StatsAggregator::new();
        stats.reset();
        stats.record_outcome(&ok(5));
        stats.record_outcome(&RequestOutcome::failure(FailureReason::Timeout));
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.total_errors, 0);
        assert_eq!(snapshot.bytes_received, 0);
        assert_eq!(snapshot.errors, ErrorBreakdown::default());
        assert_eq!(snapshot.requests_per_second, 0.0);
        assert!(snapshot.latency.is_none());
    }

    #[test]
    fn test_never_started_has_zero_elapsed() {
        let snapshot = StatsAggregator::new().snapshot();
        assert_eq!(snapshot.elapsed, Duration::ZERO);
        assert_eq!(snapshot.requests_per_second, 0.0);
        assert_eq!(snapshot.error_rate(), 0.0);
        assert_eq!(snapshot.success_rate_percent(), 100.0);
    }

    #[test]
    fn test_failures_are_broken_down_by_reason() {
        let stats = StatsAggregator::new();
        stats.reset();

        let failures = [
            FailureReason::Timeout,
            FailureReason::Timeout,
            FailureReason::Connection,
            FailureReason::HttpStatus { status: 404 },
            FailureReason::HttpStatus { status: 500 },
            FailureReason::HttpStatus { status: 503 },
            FailureReason::Unknown,
        ];
        for reason in failures {
            stats.record_outcome(&RequestOutcome::failure(reason));
        }
        stats.record_outcome(&ok(10));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 8);
        assert_eq!(snapshot.total_errors, 7);
        assert_eq!(snapshot.successful_requests(), 1);
        assert_eq!(
            snapshot.errors,
            ErrorBreakdown {
                timeouts: 2,
                connection_errors: 1,
                http_errors: 3,
                unknown_errors: 1,
            }
        );
        assert_eq!(snapshot.errors.total(), snapshot.total_errors);
        assert!((snapshot.error_rate() - 7.0 / 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latency_window_keeps_most_recent() {
        let stats = StatsAggregator::new();
        stats.reset();

        // 1..=150ms; the window should hold 51..=150
        for millis in 1..=150 {
            stats.record_outcome(&ok(millis));
        }

        let latency = stats.snapshot().latency.unwrap();
        assert_eq!(latency.samples, LATENCY_WINDOW);
        assert_eq!(latency.min, Duration::from_millis(51));
        assert_eq!(latency.max, Duration::from_millis(150));
        assert_eq!(latency.average, Duration::from_micros(100_500));
        assert_eq!(latency.median, Duration::from_micros(100_500));
    }

    #[test]
    fn test_median_of_odd_window() {
        let stats = StatsAggregator::new();
        stats.reset();
        for millis in [30, 10, 500] {
            stats.record_outcome(&ok(millis));
        }

        let latency = stats.snapshot().latency.unwrap();
        assert_eq!(latency.median, Duration::from_millis(30));
        assert_eq!(latency.average, Duration::from_millis(180));
    }

    #[test]
    fn test_elapsed_freezes_after_stop() {
        let stats = StatsAggregator::new();
        stats.reset();
        std::thread::sleep(Duration::from_millis(20));
        stats.mark_stopped();

        let first = stats.snapshot().elapsed;
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(stats.snapshot().elapsed, first);
        assert!(first >= Duration::from_millis(20));
    }

    #[test]
    fn test_concurrent_recording_loses_nothing() {
        for workers in [1usize, 10, 50] {
            for per_worker in [100u64, 1_000] {
                let stats = Arc::new(StatsAggregator::new());
                stats.reset();

                std::thread::scope(|scope| {
                    for worker in 0..workers {
                        let stats = Arc::clone(&stats);
                        scope.spawn(move || {
                            for i in 0..per_worker {
                                if (i + worker as u64) % 4 == 0 {
                                    stats.record_outcome(&RequestOutcome::failure(
                                        FailureReason::Connection,
                                    ));
                                } else {
                                    stats.record_outcome(&ok(1));
                                }
                            }
                        });
                    }
                });

                let expected_errors: u64 = (0..workers)
                    .map(|w| (0..per_worker).filter(|i| (i + w as u64) % 4 == 0).count() as u64)
                    .sum();

                let snapshot = stats.snapshot();
                assert_eq!(snapshot.total_requests, workers as u64 * per_worker);
                assert_eq!(snapshot.total_errors, expected_errors);
                assert_eq!(snapshot.errors.connection_errors, expected_errors);
                assert_eq!(snapshot.bytes_received, snapshot.successful_requests() * 100);
            }
        }
    }

    #[test]
    fn test_snapshots_during_recording_are_consistent() {
        let stats = Arc::new(StatsAggregator::new());
        stats.reset();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let stats = Arc::clone(&stats);
                scope.spawn(move || {
                    for _ in 0..5_000 {
                        stats.record_outcome(&RequestOutcome::failure(FailureReason::Timeout));
                    }
                });
            }

            let mut last_total = 0;
            for _ in 0..1_000 {
                let snapshot = stats.snapshot();
                assert!(snapshot.total_errors <= snapshot.total_requests);
                assert!(snapshot.total_requests >= last_total);
                last_total = snapshot.total_requests;
            }
        });
    }
}
