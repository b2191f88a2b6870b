//! Prometheus metrics infrastructure
//!
//! Counters are emitted through the `metrics` facade and are no-ops until
//! a recorder is installed with [`init_metrics`].

use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

pub const CACHE_LOOKUPS_TOTAL: &str = "inference_cache_lookups_total";
pub const CACHE_EVICTIONS_TOTAL: &str = "inference_cache_evictions_total";
pub const ADMISSION_DECISIONS_TOTAL: &str = "admission_decisions_total";
pub const SWEEP_REMOVED_TOTAL: &str = "sweep_removed_total";

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("inference_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Expired,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record a cache lookup
pub fn record_cache_lookup(cache: &'static str, outcome: CacheOutcome) {
    counter!(CACHE_LOOKUPS_TOTAL, "cache" => cache, "outcome" => outcome.as_str()).increment(1);
}

/// Record an LRU eviction
pub fn record_eviction(cache: &'static str) {
    counter!(CACHE_EVICTIONS_TOTAL, "cache" => cache).increment(1);
}

/// Record an admission decision
pub fn record_admission(limiter: &'static str, allowed: bool) {
    let decision = if allowed { "allowed" } else { "blocked" };
    counter!(ADMISSION_DECISIONS_TOTAL, "limiter" => limiter, "decision" => decision).increment(1);
}

/// Record entries removed by a sweep
pub fn record_sweep(target: &'static str, removed: usize) {
    counter!(SWEEP_REMOVED_TOTAL, "target" => target).increment(removed as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_outcome_labels() {
        assert_eq!(CacheOutcome::Hit.to_string(), "hit");
        assert_eq!(CacheOutcome::Miss.to_string(), "miss");
        assert_eq!(CacheOutcome::Expired.to_string(), "expired");
    }

    #[test]
    fn test_init_metrics_disabled() {
        assert!(init_metrics(&MetricsConfig::default()).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_lookup("exact", CacheOutcome::Hit);
        record_eviction("exact");
        record_admission("token_bucket", false);
        record_sweep("exact", 3);
    }
}
