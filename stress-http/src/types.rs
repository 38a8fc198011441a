//! Endpoint and request outcome types

use crate::errors::HttpError;
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use stress_config::{EndpointKind, TargetEntry};

/// An immutable request target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    kind: EndpointKind,
}

impl Endpoint {
    /// Parse and validate a target URL
    pub fn new(url: &str, kind: EndpointKind) -> Result<Self, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self { url, kind }),
            other => Err(HttpError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }
}

impl TryFrom<&TargetEntry> for Endpoint {
    type Error = HttpError;

    fn try_from(entry: &TargetEntry) -> Result<Self, Self::Error> {
        Endpoint::new(&entry.url, entry.kind)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.kind)
    }
}

/// Why a request attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// The request did not complete within its timeout
    Timeout,
    /// Connection refused, reset, or name resolution failed
    Connection,
    /// The server answered with a status of 400 or above
    HttpStatus { status: u16 },
    /// Anything else: body decode errors, redirect loops, builder errors
    Unknown,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::Connection => write!(f, "connection error"),
            FailureReason::HttpStatus { status } => write!(f, "HTTP {}", status),
            FailureReason::Unknown => write!(f, "unknown error"),
        }
    }
}

/// The classified result of one request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success {
        /// Dispatch to end of body
        latency: Duration,
        /// Body bytes received
        bytes: u64,
    },
    Failure {
        reason: FailureReason,
    },
}

impl RequestOutcome {
    pub fn success(latency: Duration, bytes: u64) -> Self {
        RequestOutcome::Success { latency, bytes }
    }

    pub fn failure(reason: FailureReason) -> Self {
        RequestOutcome::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            RequestOutcome::Failure { reason } => Some(*reason),
            RequestOutcome::Success { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_rejects_bad_urls() {
        assert!(Endpoint::new("http://httpbin.org/bytes/1024", EndpointKind::FixedPayload).is_ok());
        assert!(matches!(
            Endpoint::new("httpbin.org/bytes", EndpointKind::FixedPayload),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Endpoint::new("ws://httpbin.org/stream", EndpointKind::StreamingChunks),
            Err(HttpError::UnsupportedScheme(scheme)) if scheme == "ws"
        ));
    }

    #[test]
    fn test_endpoint_from_target_entry() {
        let entry = TargetEntry::new("https://httpbin.org/json", EndpointKind::StructuredData);
        let endpoint = Endpoint::try_from(&entry).unwrap();
        assert_eq!(endpoint.url().as_str(), "https://httpbin.org/json");
        assert_eq!(endpoint.kind(), EndpointKind::StructuredData);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = RequestOutcome::success(Duration::from_millis(12), 1024);
        assert!(ok.is_success());
        assert_eq!(ok.failure_reason(), None);

        let failed = RequestOutcome::failure(FailureReason::HttpStatus { status: 503 });
        assert!(!failed.is_success());
        assert_eq!(
            failed.failure_reason(),
            Some(FailureReason::HttpStatus { status: 503 })
        );
        assert_eq!(FailureReason::HttpStatus { status: 503 }.to_string(), "HTTP 503");
    }
}
