//! Rate limit configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Defaults used by callers that do not carry their own per-identifier limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per minute granted to an identifier
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum admissions per trailing minute for the burst-aware limiter
    #[serde(default = "default_burst_limit")]
    pub burst_limit: u32,

    /// Buckets not refilled for this long are dropped by the sweeper
    #[serde(default = "default_inactive_after_secs")]
    pub inactive_after_secs: u64,
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_burst_limit() -> u32 {
    10
}

fn default_inactive_after_secs() -> u64 {
    600
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            burst_limit: default_burst_limit(),
            inactive_after_secs: default_inactive_after_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Create a new rate limit configuration
    pub fn new(requests_per_minute: u32, burst_limit: u32) -> Self {
        Self {
            requests_per_minute,
            burst_limit,
            ..Default::default()
        }
    }

    /// Set the idle time after which a bucket is dropped
    pub fn with_inactive_after(mut self, max_age: Duration) -> Self {
        self.inactive_after_secs = max_age.as_secs();
        self
    }

    /// Idle time after which a bucket is dropped
    pub fn inactive_after(&self) -> Duration {
        Duration::from_secs(self.inactive_after_secs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.requests_per_minute == 0 {
            return Err(DomainError::configuration(
                "rate_limit requests_per_minute must be positive",
            ));
        }

        if self.burst_limit == 0 {
            return Err(DomainError::configuration(
                "rate_limit burst_limit must be positive",
            ));
        }

        if self.inactive_after_secs == 0 {
            return Err(DomainError::configuration(
                "rate_limit inactive_after_secs must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();

        assert_eq!(config.requests_per_minute, 60);
        assert_eq!(config.burst_limit, 10);
        assert_eq!(config.inactive_after(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new() {
        let config = RateLimitConfig::new(120, 20).with_inactive_after(Duration::from_secs(60));

        assert_eq!(config.requests_per_minute, 120);
        assert_eq!(config.burst_limit, 20);
        assert_eq!(config.inactive_after_secs, 60);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(RateLimitConfig::new(0, 10).validate().is_err());
        assert!(RateLimitConfig::new(10, 0).validate().is_err());
    }
}
