//! Admission statistics

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Converts a monotonic instant into an approximate wall-clock time
pub(crate) fn wall_clock(instant: Instant, now: Instant) -> DateTime<Utc> {
    let age = TimeDelta::from_std(now.saturating_duration_since(instant))
        .unwrap_or_else(|_| TimeDelta::zero());
    Utc::now() - age
}

/// State of a single bucket as seen by a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSnapshot {
    pub capacity: u32,
    pub current_tokens: u32,
    pub refill_rate: u32,
    pub last_refill: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_requests: Option<usize>,
}

/// Per-limiter bucket statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionStats {
    pub active_buckets: usize,
    pub buckets: BTreeMap<String, BucketSnapshot>,
}

/// Aggregate decisions of a burst-aware limiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAdmissionStats {
    pub total_requests: u64,
    pub allowed_requests: u64,
    pub blocked_requests: u64,
}

impl GlobalAdmissionStats {
    /// Records a decision
    pub fn record(&mut self, allowed: bool) {
        self.total_requests += 1;

        if allowed {
            self.allowed_requests += 1;
        } else {
            self.blocked_requests += 1;
        }
    }

    /// Fraction of requests that were blocked
    pub fn block_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }

        self.blocked_requests as f64 / self.total_requests as f64
    }
}
