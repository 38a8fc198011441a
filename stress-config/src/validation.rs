//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};
use std::ops::RangeInclusive;

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate that a value lies inside an inclusive range
pub fn validate_range<T>(
    value: T,
    range: &RangeInclusive<T>,
    field_name: &str,
    domain: &str,
) -> ConfigResult<()>
where
    T: PartialOrd + Copy + Into<u64>,
{
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange {
            domain: domain.to_string(),
            field: field_name.to_string(),
            value: value.into(),
            min: (*range.start()).into(),
            max: (*range.end()).into(),
        });
    }
    Ok(())
}

/// Validate an HTTP(S) URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    // Only plain GET over http/https is issued against targets
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} scheme '{}' not allowed (only http/https)",
                field_name, scheme
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range_bounds_are_inclusive() {
        let range = 10u32..=100;
        assert!(validate_range(10u32, &range, "intensity", "engine").is_ok());
        assert!(validate_range(100u32, &range, "intensity", "engine").is_ok());

        let err = validate_range(9u32, &range, "intensity", "engine").unwrap_err();
        match err {
            ConfigError::OutOfRange { field, value, min, max, .. } => {
                assert_eq!(field, "intensity");
                assert_eq!(value, 9);
                assert_eq!(min, 10);
                assert_eq!(max, 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(validate_range(101u32, &range, "intensity", "engine").is_err());
    }

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("http://httpbin.org/bytes/1024", "url", "targets").is_ok());
        assert!(validate_url("https://httpbin.org/json", "url", "targets").is_ok());
        assert!(validate_url("ftp://example.com/file", "url", "targets").is_err());
        assert!(validate_url("not-a-url", "url", "targets").is_err());
        assert!(validate_url("", "url", "targets").is_err());
    }

    #[test]
    fn test_malformed_url_reports_domain() {
        match validate_url("http://[::1", "endpoints[2].url", "targets") {
            Err(ConfigError::DomainError { domain, message }) => {
                assert_eq!(domain, "targets");
                assert!(message.contains("endpoints[2].url has invalid URL format"));
            }
            other => panic!("expected a domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1u64, "timeout", "http").is_ok());
        assert!(validate_positive(0u64, "timeout", "http").is_err());
    }
}
