//! HTTP error types

/// Error type for HTTP client setup.
///
/// Individual requests never fail with this type; they produce a
/// [`RequestOutcome`](crate::RequestOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}' (only http/https)")]
    UnsupportedScheme(String),
}
