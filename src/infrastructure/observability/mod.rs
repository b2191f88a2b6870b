//! Observability infrastructure - Prometheus metrics for caches and limiters

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    init_metrics, record_admission, record_cache_lookup, record_eviction, record_sweep,
    CacheOutcome, PrometheusMetrics,
};
