//! HTTP request execution for the wifi-stress load generator
//!
//! This crate owns the [`RequestExecutor`] seam used by engine workers, the
//! pooled reqwest-backed [`HttpExecutor`], and a [`StubExecutor`] for
//! exercising the engine without a network.

pub mod client;
pub mod errors;
pub mod executor;
pub mod stub;
pub mod types;

// Re-export main types for convenience
pub use client::HttpExecutor;
pub use errors::HttpError;
pub use executor::RequestExecutor;
pub use stub::StubExecutor;
pub use types::{Endpoint, FailureReason, RequestOutcome};

pub use stress_config::EndpointKind;
