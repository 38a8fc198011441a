//! Engine error types

use stress_config::ConfigError;
use stress_http::HttpError;
use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Lifecycle and setup errors.
///
/// Request failures are never reported here; they are counted in the
/// statistics instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration outside its documented bounds
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// `start` while a run is active or still stopping
    #[error("Engine is already running")]
    AlreadyRunning,

    /// Operation needs an active run
    #[error("Engine is not running")]
    NotRunning,

    /// A catalog needs at least one endpoint
    #[error("Endpoint catalog is empty")]
    EmptyCatalog,

    /// HTTP client or endpoint setup failed
    #[error("HTTP setup error: {0}")]
    Http(#[from] HttpError),

    /// Workers can only be spawned from inside a tokio runtime
    #[error("No tokio runtime available to spawn workers")]
    NoRuntime,
}
