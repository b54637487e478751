//! Engine configuration.
//!
//! ```rust
//! use caretrack::config::EngineConfig;
//! use std::time::Duration;
//!
//! let config = EngineConfig::builder()
//!     .location_timeout(Duration::from_secs(15))
//!     .display_offset_minutes(330)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.location_timeout(), Duration::from_secs(15));
//! ```

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SUCCESS_NOTICE_TTL_MS: u64 = 3_000;
pub const DEFAULT_ERROR_NOTICE_TTL_MS: u64 = 5_000;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("display offset {minutes} min is outside +/-14h")]
    OffsetOutOfRange { minutes: i32 },

    #[error("invalid configuration document: {0}")]
    Parse(String),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Tunables of the lifecycle engine. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded wait for a location reading.
    pub location_timeout_ms: u64,
    /// How long success notices stay visible.
    pub success_notice_ttl_ms: u64,
    /// How long failure notices stay visible.
    pub error_notice_ttl_ms: u64,
    /// UTC offset used when formatting times for display.
    pub display_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            success_notice_ttl_ms: DEFAULT_SUCCESS_NOTICE_TTL_MS,
            error_notice_ttl_ms: DEFAULT_ERROR_NOTICE_TTL_MS,
            display_offset_minutes: 0,
        }
    }
}

fn positive(value: u64, field: &'static str) -> Validation<(), NonEmptyVec<ConfigError>> {
    if value > 0 {
        Validation::success(())
    } else {
        Validation::fail(ConfigError::ZeroDuration { field })
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.into_checked()
    }

    /// Check every field, accumulating all problems.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let minutes = self.display_offset_minutes;
        let offset = if (-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            Validation::success(())
        } else {
            Validation::fail(ConfigError::OffsetOutOfRange { minutes })
        };

        Validation::all_vec(vec![
            positive(self.location_timeout_ms, "location_timeout_ms"),
            positive(self.success_notice_ttl_ms, "success_notice_ttl_ms"),
            positive(self.error_notice_ttl_ms, "error_notice_ttl_ms"),
            offset,
        ])
        .map(|_| ())
    }

    fn into_checked(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(ConfigError::Invalid(
                errors.iter().map(|e| e.to_string()).collect(),
            )),
        }
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    pub fn success_notice_ttl(&self) -> Duration {
        Duration::from_millis(self.success_notice_ttl_ms)
    }

    pub fn error_notice_ttl(&self) -> Duration {
        Duration::from_millis(self.error_notice_ttl_ms)
    }

    /// Display offset; falls back to UTC if the stored value is out of range.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }
}

/// Fluent builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location_timeout(mut self, timeout: Duration) -> Self {
        self.config.location_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn success_notice_ttl(mut self, ttl: Duration) -> Self {
        self.config.success_notice_ttl_ms = duration_ms(ttl);
        self
    }

    pub fn error_notice_ttl(mut self, ttl: Duration) -> Self {
        self.config.error_notice_ttl_ms = duration_ms(ttl);
        self
    }

    pub fn display_offset_minutes(mut self, minutes: i32) -> Self {
        self.config.display_offset_minutes = minutes;
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.into_checked()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_field_app() {
        let config = EngineConfig::default();
        assert_eq!(config.location_timeout(), Duration::from_secs(10));
        assert_eq!(config.success_notice_ttl(), Duration::from_secs(3));
        assert_eq!(config.error_notice_ttl(), Duration::from_secs(5));
        assert!(config.validate().is_success());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = EngineConfig::from_json(r#"{"location_timeout_ms": 2500}"#).unwrap();
        assert_eq!(config.location_timeout(), Duration::from_millis(2500));
        assert_eq!(config.error_notice_ttl_ms, DEFAULT_ERROR_NOTICE_TTL_MS);
    }

    #[test]
    fn json_parse_errors_are_reported() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_accumulates_all_problems() {
        let config = EngineConfig {
            location_timeout_ms: 0,
            success_notice_ttl_ms: 0,
            error_notice_ttl_ms: 5_000,
            display_offset_minutes: 15 * 60,
        };

        match config.validate() {
            Validation::Failure(errors) => assert_eq!(errors.len(), 3),
            Validation::Success(_) => panic!("Expected failures, got success"),
        }

        match EngineConfig::from_json(&serde_json::to_string(&config).unwrap()) {
            Err(ConfigError::Invalid(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn extreme_offsets_are_rejected() {
        for minutes in [i32::MIN, i32::MAX, -(MAX_OFFSET_MINUTES + 1)] {
            let json = format!(r#"{{"display_offset_minutes": {minutes}}}"#);
            match EngineConfig::from_json(&json) {
                Err(ConfigError::Invalid(problems)) => assert_eq!(problems.len(), 1),
                other => panic!("Expected Invalid for {minutes}, got {other:?}"),
            }
        }

        let edge = EngineConfig::from_json(r#"{"display_offset_minutes": -840}"#).unwrap();
        assert_eq!(edge.display_offset().local_minus_utc(), -840 * 60);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = EngineConfig::builder()
            .location_timeout(Duration::from_millis(50))
            .success_notice_ttl(Duration::from_secs(1))
            .error_notice_ttl(Duration::from_secs(2))
            .display_offset_minutes(330)
            .build()
            .unwrap();

        assert_eq!(config.location_timeout_ms, 50);
        assert_eq!(config.display_offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = EngineConfig::builder()
            .location_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
