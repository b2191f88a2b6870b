//! Exact cache entry

use std::time::{Duration, Instant};

/// A cached value with its expiry and access bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    key: String,
    value: V,
    created_at: Instant,
    expires_at: Instant,
    access_count: u64,
    last_access: Instant,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry expiring `ttl` after `now`
    ///
    /// `ttl` must be non-zero so that `expires_at > created_at`.
    pub fn new(key: impl Into<String>, value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at: now + ttl,
            access_count: 0,
            last_access: now,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    /// An entry is visible iff `now < expires_at`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Records a hit
    pub fn touch(&mut self, now: Instant) {
        self.access_count += 1;
        self.last_access = now;
    }
}
