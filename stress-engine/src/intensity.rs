//! Mapping from operator knobs to worker count and pacing delay

use serde::Serialize;
use std::time::Duration;
use stress_config::domains::engine::{DELAY_MILLIS_RANGE, INTENSITY_RANGE};
use stress_config::EngineConfig;

/// Fraction of the base delay removed at full intensity.
///
/// Intensity 10 keeps the whole base delay, intensity 100 keeps a tenth of it.
pub const DELAY_DAMPING_FACTOR: f64 = 0.9;

/// Lower bound on the effective per-request delay
pub const MIN_REQUEST_DELAY: Duration = Duration::from_millis(10);

/// Resolved pacing for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerPlan {
    /// Number of worker tasks to run
    pub worker_count: usize,

    /// Sleep between one worker's consecutive requests
    #[serde(with = "humantime_serde")]
    pub per_request_delay: Duration,
}

/// Compute the worker plan for an engine configuration.
///
/// Pure and deterministic. The effective delay falls monotonically as
/// intensity rises at a fixed base delay, and never drops below
/// [`MIN_REQUEST_DELAY`]. Out-of-range inputs are clamped here; the engine
/// rejects them before this point.
pub fn compute_worker_plan(config: &EngineConfig) -> WorkerPlan {
    let config = config.clamped();

    let intensity_span = f64::from(INTENSITY_RANGE.end() - INTENSITY_RANGE.start());
    let intensity_fraction =
        f64::from(config.intensity_percent - INTENSITY_RANGE.start()) / intensity_span;
    let scale = 1.0 - intensity_fraction * DELAY_DAMPING_FACTOR;

    // Round to whole microseconds so equal inputs always give equal plans
    let base_micros = config.delay_millis as f64 * 1_000.0;
    let effective = Duration::from_micros((base_micros * scale).round() as u64);

    WorkerPlan {
        worker_count: config.concurrency as usize,
        per_request_delay: effective.max(MIN_REQUEST_DELAY),
    }
}

/// Rough request rate a plan can produce if requests took no time at all
pub fn peak_requests_per_second(plan: &WorkerPlan) -> f64 {
    plan.worker_count as f64 / plan.per_request_delay.as_secs_f64()
}

/// Full intensity with a large pool, or the delay floor
pub fn is_extreme(config: &EngineConfig) -> bool {
    (config.intensity_percent == *INTENSITY_RANGE.end() && config.concurrency >= 40)
        || config.delay_millis <= *DELAY_MILLIS_RANGE.start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn delay_for(intensity: u32, delay_millis: u64) -> Duration {
        compute_worker_plan(&EngineConfig::new(intensity, 1, delay_millis)).per_request_delay
    }

    #[test]
    fn test_boundary_plans() {
        let cases = [
            // (intensity, concurrency, delay ms) -> (workers, effective ms)
            ((10, 1, 1000), (1, 1000)),
            ((100, 1, 1000), (1, 100)),
            ((50, 5, 200), (5, 120)),
            ((10, 50, 10), (50, 10)),
            ((100, 50, 10), (50, 10)),
            ((100, 3, 50), (3, 10)),
        ];

        for ((intensity, concurrency, delay), (workers, effective)) in cases {
            let plan = compute_worker_plan(&EngineConfig::new(intensity, concurrency, delay));
            assert_eq!(plan.worker_count, workers, "workers for {intensity}/{concurrency}/{delay}");
            assert_eq!(
                plan.per_request_delay,
                Duration::from_millis(effective),
                "delay for {intensity}/{concurrency}/{delay}"
            );
        }
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let plan = compute_worker_plan(&EngineConfig::new(0, 0, 0));
        assert_eq!(plan.worker_count, 1);
        assert_eq!(plan.per_request_delay, MIN_REQUEST_DELAY);

        let plan = compute_worker_plan(&EngineConfig::new(500, 500, 50_000));
        assert_eq!(plan.worker_count, 50);
        assert_eq!(plan.per_request_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_extreme_detection() {
        assert!(!is_extreme(&EngineConfig::default()));
        assert!(!is_extreme(&EngineConfig::new(100, 39, 200)));
        assert!(!is_extreme(&EngineConfig::new(90, 50, 200)));
        assert!(is_extreme(&EngineConfig::new(100, 40, 200)));
        assert!(is_extreme(&EngineConfig::new(50, 5, 10)));
    }

    #[test]
    fn test_peak_rate() {
        let plan = compute_worker_plan(&EngineConfig::new(100, 10, 100));
        assert_eq!(plan.per_request_delay, MIN_REQUEST_DELAY);
        assert!((peak_requests_per_second(&plan) - 1000.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_delay_is_monotonic_in_intensity(
            low in 10u32..=100,
            high in 10u32..=100,
            delay in 10u64..=1000,
        ) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            prop_assert!(delay_for(high, delay) <= delay_for(low, delay));
        }

        #[test]
        fn prop_delay_is_bounded(intensity in 10u32..=100, delay in 10u64..=1000) {
            let effective = delay_for(intensity, delay);
            prop_assert!(effective >= MIN_REQUEST_DELAY);
            prop_assert!(effective <= Duration::from_millis(delay));
        }

        #[test]
        fn prop_plan_is_deterministic(
            intensity in 10u32..=100,
            concurrency in 1u32..=50,
            delay in 10u64..=1000,
        ) {
            let config = EngineConfig::new(intensity, concurrency, delay);
            prop_assert_eq!(compute_worker_plan(&config), compute_worker_plan(&config));
            prop_assert_eq!(compute_worker_plan(&config).worker_count, concurrency as usize);
        }
    }
}
