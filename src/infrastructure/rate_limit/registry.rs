//! Per-identifier bucket registry shared by the limiters

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::domain::rate_limit::{AdmissionStats, Bucket};
use crate::domain::DomainError;

/// Map of identifier to bucket
///
/// Every bucket operation runs while the map lock is held (shared for
/// existing buckets, exclusive when creating one), so `remove` and
/// `cleanup_inactive` can never detach a bucket in the middle of a
/// decision. Lock order is always map, then bucket.
#[derive(Debug)]
pub struct BucketRegistry<B> {
    buckets: RwLock<HashMap<String, Mutex<B>>>,
}

impl<B: Bucket> BucketRegistry<B> {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Applies `f` to the bucket for `identifier`, if any
    pub fn with_existing<R>(
        &self,
        identifier: &str,
        f: impl FnOnce(&mut B) -> R,
    ) -> Result<Option<R>, DomainError> {
        let buckets = self.buckets.read().map_err(DomainError::poisoned)?;

        match buckets.get(identifier) {
            Some(bucket) => {
                let mut bucket = bucket.lock().map_err(DomainError::poisoned)?;
                Ok(Some(f(&mut bucket)))
            }
            None => Ok(None),
        }
    }

    /// Applies `f` to the bucket for `identifier`, creating it with
    /// `create` if absent. Concurrent first callers all observe the same
    /// bucket.
    pub fn with_bucket<R>(
        &self,
        identifier: &str,
        create: impl FnOnce() -> B,
        f: impl FnOnce(&mut B) -> R,
    ) -> Result<R, DomainError> {
        {
            let buckets = self.buckets.read().map_err(DomainError::poisoned)?;
            if let Some(bucket) = buckets.get(identifier) {
                let mut bucket = bucket.lock().map_err(DomainError::poisoned)?;
                return Ok(f(&mut bucket));
            }
        }

        let mut buckets = self.buckets.write().map_err(DomainError::poisoned)?;
        let bucket = buckets
            .entry(identifier.to_string())
            .or_insert_with(|| {
                tracing::debug!(identifier = %identifier, "Created bucket");
                Mutex::new(create())
            });
        let mut bucket = bucket.lock().map_err(DomainError::poisoned)?;

        Ok(f(&mut bucket))
    }

    /// Drops a bucket; returns whether it existed
    pub fn remove(&self, identifier: &str) -> Result<bool, DomainError> {
        let mut buckets = self.buckets.write().map_err(DomainError::poisoned)?;
        Ok(buckets.remove(identifier).is_some())
    }

    /// Drops buckets whose last refill is older than `max_age`
    pub fn cleanup_inactive(&self, max_age: Duration) -> Result<usize, DomainError> {
        let mut buckets = self.buckets.write().map_err(DomainError::poisoned)?;
        let now = Instant::now();

        let before = buckets.len();
        buckets.retain(|_, bucket| {
            let bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
            now.saturating_duration_since(bucket.last_refill()) <= max_age
        });
        let removed = before - buckets.len();

        if removed > 0 {
            tracing::debug!(removed, "Removed inactive buckets");
        }

        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, DomainError> {
        let buckets = self.buckets.read().map_err(DomainError::poisoned)?;
        Ok(buckets.len())
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of every bucket, projected to the current time
    pub fn stats(&self) -> Result<AdmissionStats, DomainError> {
        let buckets = self.buckets.read().map_err(DomainError::poisoned)?;
        let now = Instant::now();

        let mut snapshots = BTreeMap::new();
        for (identifier, bucket) in buckets.iter() {
            let bucket = bucket.lock().map_err(DomainError::poisoned)?;
            snapshots.insert(identifier.clone(), bucket.snapshot(now));
        }

        Ok(AdmissionStats {
            active_buckets: snapshots.len(),
            buckets: snapshots,
        })
    }
}

impl<B: Bucket> Default for BucketRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_limit::TokenBucket;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    fn create_bucket(registry: &BucketRegistry<TokenBucket>, identifier: &str, capacity: u32) {
        registry
            .with_bucket(identifier, || TokenBucket::new(capacity, Instant::now()), |_| ())
            .unwrap();
    }

    #[test]
    fn test_with_bucket_reuses_bucket() {
        let registry = BucketRegistry::new();
        create_bucket(&registry, "user", 10);

        let capacity = registry
            .with_bucket(
                "user",
                || TokenBucket::new(99, Instant::now()),
                |bucket| bucket.capacity(),
            )
            .unwrap();

        assert_eq!(capacity, 10);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_with_existing_skips_unknown() {
        let registry = BucketRegistry::new();
        create_bucket(&registry, "user", 10);

        let known = registry.with_existing("user", |bucket| bucket.capacity()).unwrap();
        let unknown = registry.with_existing("other", |bucket| bucket.capacity()).unwrap();

        assert_eq!(known, Some(10));
        assert_eq!(unknown, None);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_creation_yields_one_bucket() {
        let registry = Arc::new(BucketRegistry::new());
        let created = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let created = Arc::clone(&created);
                thread::spawn(move || {
                    registry
                        .with_bucket(
                            "shared",
                            || {
                                created.fetch_add(1, Ordering::SeqCst);
                                TokenBucket::new(10, Instant::now())
                            },
                            |_| (),
                        )
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_removal_waits_for_bucket_operation() {
        let registry = Arc::new(BucketRegistry::new());
        create_bucket(&registry, "user", 10);
        let removed = Arc::new(AtomicBool::new(false));

        let remover = registry
            .with_bucket(
                "user",
                || TokenBucket::new(10, Instant::now()),
                |_| {
                    let registry = Arc::clone(&registry);
                    let removed_flag = Arc::clone(&removed);
                    let handle = thread::spawn(move || {
                        let existed = registry.remove("user").unwrap();
                        removed_flag.store(true, Ordering::SeqCst);
                        existed
                    });
                    thread::sleep(Duration::from_millis(50));
                    assert!(!removed.load(Ordering::SeqCst));
                    handle
                },
            )
            .unwrap();

        assert!(remover.join().unwrap());
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_remove() {
        let registry = BucketRegistry::new();
        create_bucket(&registry, "user", 10);

        assert!(registry.remove("user").unwrap());
        assert!(!registry.remove("user").unwrap());
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_cleanup_inactive() {
        let registry = BucketRegistry::new();
        create_bucket(&registry, "idle", 10);

        assert_eq!(registry.cleanup_inactive(Duration::from_secs(60)).unwrap(), 0);

        thread::sleep(Duration::from_millis(30));

        assert_eq!(registry.cleanup_inactive(Duration::from_millis(10)).unwrap(), 1);
        assert!(registry.with_existing("idle", |_| ()).unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let registry = BucketRegistry::new();
        create_bucket(&registry, "a", 120);
        create_bucket(&registry, "b", 10);

        let stats = registry.stats().unwrap();

        assert_eq!(stats.active_buckets, 2);
        assert_eq!(stats.buckets["a"].capacity, 120);
        assert_eq!(stats.buckets["a"].refill_rate, 2);
        assert_eq!(stats.buckets["b"].current_tokens, 10);
    }
}
