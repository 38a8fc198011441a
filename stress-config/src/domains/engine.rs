//! Load engine pacing configuration

use crate::error::ConfigResult;
use crate::validation::{validate_range, Validatable};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted intensity percentages
pub const INTENSITY_RANGE: RangeInclusive<u32> = 10..=100;

/// Accepted number of concurrent workers
pub const CONCURRENCY_RANGE: RangeInclusive<u32> = 1..=50;

/// Accepted base inter-request delay in milliseconds
pub const DELAY_MILLIS_RANGE: RangeInclusive<u64> = 10..=1000;

/// Operator-facing pacing knobs for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How aggressively requests are paced, 10-100
    #[serde(default = "default_intensity_percent")]
    pub intensity_percent: u32,

    /// Number of concurrent workers, 1-50
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Base delay between a worker's requests in milliseconds, 10-1000
    #[serde(default = "default_delay_millis")]
    pub delay_millis: u64,
}

impl EngineConfig {
    pub fn new(intensity_percent: u32, concurrency: u32, delay_millis: u64) -> Self {
        Self {
            intensity_percent,
            concurrency,
            delay_millis,
        }
    }

    /// Copy of this config with every field forced into its accepted range.
    ///
    /// The engine itself rejects out-of-range values; this is for callers
    /// (sliders, spin boxes) that would rather snap to the nearest bound.
    pub fn clamped(&self) -> Self {
        Self {
            intensity_percent: self
                .intensity_percent
                .clamp(*INTENSITY_RANGE.start(), *INTENSITY_RANGE.end()),
            concurrency: self
                .concurrency
                .clamp(*CONCURRENCY_RANGE.start(), *CONCURRENCY_RANGE.end()),
            delay_millis: self
                .delay_millis
                .clamp(*DELAY_MILLIS_RANGE.start(), *DELAY_MILLIS_RANGE.end()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            intensity_percent: default_intensity_percent(),
            concurrency: default_concurrency(),
            delay_millis: default_delay_millis(),
        }
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(
            self.intensity_percent,
            &INTENSITY_RANGE,
            "intensity_percent",
            self.domain_name(),
        )?;
        validate_range(
            self.concurrency,
            &CONCURRENCY_RANGE,
            "concurrency",
            self.domain_name(),
        )?;
        validate_range(
            self.delay_millis,
            &DELAY_MILLIS_RANGE,
            "delay_millis",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "engine"
    }
}

// Default value functions
fn default_intensity_percent() -> u32 {
    50
}

fn default_concurrency() -> u32 {
    10
}

fn default_delay_millis() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn rejected_field(config: EngineConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => Some(field),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.intensity_percent, 50);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.delay_millis, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_boundaries_are_accepted() {
        for config in [
            EngineConfig::new(10, 1, 10),
            EngineConfig::new(100, 50, 1000),
            EngineConfig::new(10, 50, 1000),
            EngineConfig::new(100, 1, 10),
        ] {
            assert!(config.validate().is_ok(), "{config:?} should be valid");
        }
    }

    #[test]
    fn test_values_just_outside_boundaries_are_rejected() {
        assert_eq!(
            rejected_field(EngineConfig::new(9, 5, 100)).as_deref(),
            Some("intensity_percent")
        );
        assert_eq!(
            rejected_field(EngineConfig::new(101, 5, 100)).as_deref(),
            Some("intensity_percent")
        );
        assert_eq!(
            rejected_field(EngineConfig::new(50, 0, 100)).as_deref(),
            Some("concurrency")
        );
        assert_eq!(
            rejected_field(EngineConfig::new(50, 51, 100)).as_deref(),
            Some("concurrency")
        );
        assert_eq!(
            rejected_field(EngineConfig::new(50, 5, 9)).as_deref(),
            Some("delay_millis")
        );
        assert_eq!(
            rejected_field(EngineConfig::new(50, 5, 1001)).as_deref(),
            Some("delay_millis")
        );
    }

    #[test]
    fn test_clamped_snaps_to_bounds() {
        let low = EngineConfig::new(0, 0, 0).clamped();
        assert_eq!(low, EngineConfig::new(10, 1, 10));

        let high = EngineConfig::new(500, 200, 60_000).clamped();
        assert_eq!(high, EngineConfig::new(100, 50, 1000));

        let inside = EngineConfig::new(42, 7, 250);
        assert_eq!(inside.clamped(), inside);
        assert!(low.validate().is_ok());
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("concurrency: 3").unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.intensity_percent, 50);
        assert_eq!(config.delay_millis, 100);
    }
}
