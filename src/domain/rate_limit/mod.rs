//! Rate limit domain - token buckets, burst windows and admission traits

mod bucket;
mod config;
mod repository;
mod stats;

pub use bucket::{Bucket, SlidingWindowBucket, TokenBucket, BURST_WINDOW};
pub use config::RateLimitConfig;
pub use repository::{require_positive_limit, AdmissionLimiter, BurstAdmissionLimiter};
pub use stats::{AdmissionStats, BucketSnapshot, GlobalAdmissionStats};

#[cfg(test)]
pub use repository::MockBurstAdmissionLimiter;
