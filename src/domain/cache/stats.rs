//! Cache statistics shared by the exact and similarity caches

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a cache's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Current number of entries (expired-but-unswept included)
    pub size: usize,
    /// Configured bound
    pub max_size: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    pub evictions: u64,
    /// `hits / (hits + misses)`, 0 when there were no lookups
    pub hit_rate: f64,
    /// `misses / (hits + misses)`, 0 when there were no lookups
    pub miss_rate: f64,
}

impl CacheStats {
    /// Builds a snapshot, deriving the rates from the raw counters
    pub fn new(size: usize, max_size: usize, hits: u64, misses: u64, evictions: u64) -> Self {
        let total = hits + misses;
        let (hit_rate, miss_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            (hits as f64 / total as f64, misses as f64 / total as f64)
        };

        Self {
            size,
            max_size,
            total_hits: hits,
            total_misses: misses,
            evictions,
            hit_rate,
            miss_rate,
        }
    }
}
