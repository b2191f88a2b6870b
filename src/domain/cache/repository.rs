//! Exact cache trait definition

use std::time::Duration;

use crate::domain::DomainError;

use super::CacheStats;

/// Key-equality cache with per-entry TTL and a size bound
///
/// Callers use it as "lookup-before-call": `get` first, and on a miss run
/// the backend and `set` the result. A zero `ttl` means "use the
/// configured default".
pub trait ExactCache<V>: Send + Sync {
    /// Gets a live value, purging it if it has expired
    fn get(&self, key: &str) -> Result<Option<V>, DomainError>;

    /// Stores a value, evicting the least recently used entry when full
    fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), DomainError>;

    /// Removes a key; returns whether it was present
    fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Removes every entry and resets size and eviction counters
    fn clear(&self) -> Result<(), DomainError>;

    /// Removes all expired entries; returns how many were removed
    fn cleanup_expired(&self) -> Result<usize, DomainError>;

    /// Returns a snapshot of the cache counters
    fn stats(&self) -> Result<CacheStats, DomainError>;
}
