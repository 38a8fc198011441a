//! Target endpoint configuration

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected response shape of a target. Used for logging and reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Fixed-size byte payload
    FixedPayload,
    /// Small artificial server-side delay
    ArtificialDelay,
    /// Structured (JSON) API response
    StructuredData,
    /// Chunked streaming response
    StreamingChunks,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointKind::FixedPayload => "fixed-payload",
            EndpointKind::ArtificialDelay => "artificial-delay",
            EndpointKind::StructuredData => "structured-data",
            EndpointKind::StreamingChunks => "streaming-chunks",
        };
        f.write_str(name)
    }
}

/// How workers choose the next target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Uniformly at random
    #[default]
    Random,
    /// In catalog order, each worker starting at its own offset
    RoundRobin,
}

/// A single target URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub url: String,
    pub kind: EndpointKind,
}

impl TargetEntry {
    pub fn new(url: impl Into<String>, kind: EndpointKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Target endpoints and selection strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Endpoint selection strategy
    #[serde(default)]
    pub selection: SelectionMode,

    /// Seed for random selection; omitted means seeded from the OS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Target endpoints
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<TargetEntry>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            selection: SelectionMode::default(),
            seed: None,
            endpoints: default_endpoints(),
        }
    }
}

impl Validatable for TargetsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.endpoints.is_empty() {
            return Err(self.validation_error("At least one target endpoint must be configured"));
        }

        for entry in &self.endpoints {
            validate_url(&entry.url, "url", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "targets"
    }
}

/// Public endpoints that tolerate sustained traffic
pub fn default_endpoints() -> Vec<TargetEntry> {
    vec![
        TargetEntry::new("http://httpbin.org/bytes/1024", EndpointKind::FixedPayload),
        TargetEntry::new("http://httpbin.org/delay/0.1", EndpointKind::ArtificialDelay),
        TargetEntry::new(
            "https://jsonplaceholder.typicode.com/posts",
            EndpointKind::StructuredData,
        ),
        TargetEntry::new("http://httpbin.org/stream/10", EndpointKind::StreamingChunks),
        TargetEntry::new("https://httpbin.org/json", EndpointKind::StructuredData),
        TargetEntry::new("https://httpbin.org/uuid", EndpointKind::StructuredData),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_cover_every_kind() {
        let config = TargetsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection, SelectionMode::Random);

        for kind in [
            EndpointKind::FixedPayload,
            EndpointKind::ArtificialDelay,
            EndpointKind::StructuredData,
            EndpointKind::StreamingChunks,
        ] {
            assert!(
                config.endpoints.iter().any(|e| e.kind == kind),
                "missing {kind}"
            );
        }
    }

    #[test]
    fn test_empty_and_invalid_targets_rejected() {
        let mut config = TargetsConfig {
            endpoints: Vec::new(),
            ..TargetsConfig::default()
        };
        assert!(config.validate().is_err());

        config.endpoints = vec![TargetEntry::new("file:///etc/passwd", EndpointKind::FixedPayload)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_targets_from_yaml() {
        let yaml = r#"
selection: round_robin
seed: 7
endpoints:
  - url: http://localhost:8080/bytes
    kind: fixed_payload
  - url: http://localhost:8080/stream
    kind: streaming_chunks
"#;
        let config: TargetsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.selection, SelectionMode::RoundRobin);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[1].kind, EndpointKind::StreamingChunks);
    }
}
