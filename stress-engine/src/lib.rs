//! Load generation engine for wifi-stress
//!
//! A [`LoadEngine`] owns a pool of tokio worker tasks. Each worker picks a
//! target from the [`EndpointCatalog`], runs it through a
//! [`RequestExecutor`](stress_http::RequestExecutor), records the outcome in
//! the shared [`StatsAggregator`] and sleeps for the delay computed by
//! [`compute_worker_plan`]. Presentation layers drive the engine with
//! [`LoadEngine::start`] / [`LoadEngine::stop`] and poll
//! [`LoadEngine::stats_snapshot`] at their own cadence.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod intensity;
pub mod shutdown;
pub mod stats;

mod worker;

// Re-export commonly used types
pub use catalog::{EndpointCatalog, EndpointPicker, SelectionStrategy};
pub use engine::{LoadEngine, LoadEngineBuilder, RunState, StopReport};
pub use error::{EngineError, EngineResult};
pub use intensity::{
    compute_worker_plan, is_extreme, peak_requests_per_second, WorkerPlan, DELAY_DAMPING_FACTOR,
    MIN_REQUEST_DELAY,
};
pub use shutdown::{WorkerTracker, STOP_GRACE};
pub use stats::{ErrorBreakdown, LatencySummary, StatsAggregator, StatsSnapshot};

pub use stress_config::EngineConfig;
