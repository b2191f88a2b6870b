use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::ExactCacheConfig;
use crate::domain::rate_limit::RateLimitConfig;
use crate::domain::semantic_cache::SemanticCacheConfig;
use crate::domain::DomainError;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub exact_cache: ExactCacheConfig,
    pub similarity_cache: SemanticCacheConfig,
    pub rate_limit: RateLimitConfig,
    pub cleanup: CleanupConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Background sweep settings
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

/// Query embedding settings for the similarity cache
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Use the hash embedder; when off, similarity is lexical only
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_dimensions() -> usize {
    256
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl CleanupConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dimensions: default_embedding_dimensions(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Checks every section before any component is built
    pub fn validate(&self) -> Result<(), DomainError> {
        self.exact_cache.validate()?;
        self.similarity_cache.validate()?;
        self.rate_limit.validate()?;

        if self.cleanup.interval_secs == 0 {
            return Err(DomainError::configuration(
                "cleanup interval_secs must be positive",
            ));
        }

        if self.embedding.enabled && self.embedding.dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding dimensions must be positive",
            ));
        }

        Ok(())
    }
}
