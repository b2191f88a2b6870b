//! PMP Inference Cache
//!
//! In-process building blocks for putting an expensive inference backend
//! behind a cache and an admission gate:
//! - Exact cache keyed by a truncated SHA-256 of the request parameters
//! - Similarity cache matching reworded queries by cosine or word overlap
//! - Token bucket and burst-aware sliding window limiters
//! - A periodic sweeper for expired entries and idle buckets

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use infrastructure::services::{CacheHit, InferenceCacheService, Outcome};
