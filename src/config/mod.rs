//! Application configuration

mod app_config;

pub use app_config::{AppConfig, CleanupConfig, EmbeddingConfig, LogFormat, LoggingConfig};
