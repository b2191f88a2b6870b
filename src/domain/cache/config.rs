//! Exact cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for the exact (key-equality) cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactCacheConfig {
    /// Maximum number of entries before LRU eviction kicks in
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// TTL applied when `set` is called with a zero TTL, in seconds
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

fn default_max_entries() -> usize {
    10_000
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for ExactCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

impl ExactCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the default TTL as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_secs = ttl.as_secs();
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_entries == 0 {
            return Err(DomainError::configuration(
                "exact cache max_entries must be positive",
            ));
        }

        if self.default_ttl_secs == 0 {
            return Err(DomainError::configuration(
                "exact cache default_ttl_secs must be positive",
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
        let config = ExactCacheConfig::default();

        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.default_ttl(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ExactCacheConfig::new()
            .with_max_entries(5)
            .with_default_ttl(Duration::from_secs(30));

        assert_eq!(config.max_entries, 5);
        assert_eq!(config.default_ttl_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ExactCacheConfig::new().with_max_entries(0);
        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = ExactCacheConfig::new().with_default_ttl(Duration::from_millis(10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ExactCacheConfig = serde_json::from_str(r#"{"max_entries": 7}"#).unwrap();

        assert_eq!(config.max_entries, 7);
        assert_eq!(config.default_ttl_secs, 3600);
    }
}
