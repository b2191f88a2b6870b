//! Observability configuration

use serde::Deserialize;

/// Prometheus metrics configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Install a Prometheus recorder
    #[serde(default)]
    pub enabled: bool,
}
