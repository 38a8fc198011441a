//! Domain-driven configuration for the wifi-stress load generator
//!
//! Configuration is split by functional domain (engine pacing, HTTP client,
//! target endpoints, logging), each with its own defaults and validation.
//! A [`ConfigLoader`] reads YAML files and applies `WIFI_STRESS_*`
//! environment overrides on top.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    engine::EngineConfig,
    http::{ConnectionPoolConfig, HttpConfig},
    logging::{LogFormat, LogLevel, LoggingConfig},
    targets::{EndpointKind, SelectionMode, TargetEntry, TargetsConfig},
    StressConfig,
};
