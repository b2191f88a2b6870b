//! Token bucket admission limiter

use std::time::{Duration, Instant};

use crate::domain::rate_limit::{
    require_positive_limit, AdmissionLimiter, AdmissionStats, RateLimitConfig, TokenBucket,
};
use crate::domain::traits::Sweep;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_admission, record_sweep};

use super::BucketRegistry;

const LIMITER_NAME: &str = "token_bucket";

/// In-memory per-identifier token bucket limiter
#[derive(Debug)]
pub struct TokenBucketLimiter {
    registry: BucketRegistry<TokenBucket>,
    inactive_after: Duration,
}

impl TokenBucketLimiter {
    /// Create a limiter with the default configuration
    pub fn new() -> Self {
        Self {
            registry: BucketRegistry::new(),
            inactive_after: RateLimitConfig::default().inactive_after(),
        }
    }

    /// Create a limiter from configuration; only the idle timeout is used,
    /// limits are supplied per call
    pub fn with_config(config: &RateLimitConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            registry: BucketRegistry::new(),
            inactive_after: config.inactive_after(),
        })
    }
}

impl Default for TokenBucketLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionLimiter for TokenBucketLimiter {
    fn allow_n(&self, identifier: &str, rate_limit: u32, n: u32) -> Result<bool, DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;
        require_positive_limit("rate_limit", rate_limit)?;
        require_positive_limit("n", n)?;

        let allowed = self.registry.with_bucket(
            identifier,
            || TokenBucket::new(rate_limit, Instant::now()),
            |bucket| bucket.try_consume(n, Instant::now()),
        )?;

        record_admission(LIMITER_NAME, allowed);
        if !allowed {
            tracing::debug!(identifier = %identifier, n, "Request throttled");
        }

        Ok(allowed)
    }

    fn remaining_tokens(&self, identifier: &str) -> Result<Option<u32>, DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;

        self.registry.with_existing(identifier, |bucket| {
            bucket.refill(Instant::now());
            bucket.tokens()
        })
    }

    fn set_rate_limit(&self, identifier: &str, rate_limit: u32) -> Result<(), DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;
        require_positive_limit("rate_limit", rate_limit)?;

        self.registry.with_bucket(
            identifier,
            || TokenBucket::new(rate_limit, Instant::now()),
            |bucket| bucket.set_rate_limit(rate_limit),
        )
    }

    fn remove_identifier(&self, identifier: &str) -> Result<bool, DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;
        self.registry.remove(identifier)
    }

    fn cleanup_inactive(&self, max_age: Duration) -> Result<usize, DomainError> {
        self.registry.cleanup_inactive(max_age)
    }

    fn stats(&self) -> Result<AdmissionStats, DomainError> {
        self.registry.stats()
    }
}

impl Sweep for TokenBucketLimiter {
    fn sweep_name(&self) -> &'static str {
        LIMITER_NAME
    }

    fn sweep(&self) -> Result<usize, DomainError> {
        let removed = self.cleanup_inactive(self.inactive_after)?;
        record_sweep(LIMITER_NAME, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_conservation() {
        let limiter = TokenBucketLimiter::new();

        for _ in 0..10 {
            assert!(limiter.allow("user", 10).unwrap());
        }
        assert!(!limiter.allow("user", 10).unwrap());

        thread::sleep(Duration::from_millis(1100));

        assert!(limiter.allow("user", 10).unwrap());
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = TokenBucketLimiter::new();

        assert!(limiter.allow_n("a", 5, 5).unwrap());
        assert!(!limiter.allow("a", 5).unwrap());
        assert!(limiter.allow("b", 5).unwrap());
    }

    #[test]
    fn test_allow_n_all_or_nothing() {
        let limiter = TokenBucketLimiter::new();

        assert!(limiter.allow_n("user", 10, 7).unwrap());
        assert!(!limiter.allow_n("user", 10, 4).unwrap());
        assert_eq!(limiter.remaining_tokens("user").unwrap(), Some(3));
    }

    #[test]
    fn test_existing_bucket_keeps_its_limit() {
        let limiter = TokenBucketLimiter::new();

        assert!(limiter.allow("user", 2).unwrap());
        assert!(limiter.allow("user", 100).unwrap());
        assert!(!limiter.allow("user", 100).unwrap());
    }

    #[test]
    fn test_invalid_arguments() {
        let limiter = TokenBucketLimiter::new();

        assert!(matches!(
            limiter.allow("", 10),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            limiter.allow("user", 0),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            limiter.allow_n("user", 10, 0),
            Err(DomainError::Validation { .. })
        ));
        assert!(limiter.stats().unwrap().buckets.is_empty());
    }

    #[test]
    fn test_remaining_tokens_unknown() {
        let limiter = TokenBucketLimiter::new();

        assert_eq!(limiter.remaining_tokens("nobody").unwrap(), None);
    }

    #[test]
    fn test_empty_identifier_rejected_on_lookup_and_removal() {
        let limiter = TokenBucketLimiter::new();
        limiter.allow("user", 10).unwrap();

        assert!(matches!(
            limiter.remaining_tokens(""),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            limiter.remove_identifier(""),
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(limiter.stats().unwrap().active_buckets, 1);
    }

    #[test]
    fn test_set_rate_limit() {
        let limiter = TokenBucketLimiter::new();

        limiter.set_rate_limit("user", 100).unwrap();
        assert_eq!(limiter.remaining_tokens("user").unwrap(), Some(100));

        limiter.set_rate_limit("user", 5).unwrap();
        assert_eq!(limiter.remaining_tokens("user").unwrap(), Some(5));

        let stats = limiter.stats().unwrap();
        assert_eq!(stats.buckets["user"].capacity, 5);
        assert_eq!(stats.buckets["user"].refill_rate, 1);
    }

    #[test]
    fn test_remove_and_cleanup() {
        let limiter = TokenBucketLimiter::new();

        limiter.allow("a", 10).unwrap();
        limiter.allow("b", 10).unwrap();

        assert!(limiter.remove_identifier("a").unwrap());
        assert!(!limiter.remove_identifier("a").unwrap());

        thread::sleep(Duration::from_millis(30));

        assert_eq!(limiter.cleanup_inactive(Duration::from_millis(10)).unwrap(), 1);
        assert_eq!(limiter.stats().unwrap().active_buckets, 0);
        assert_eq!(limiter.sweep().unwrap(), 0);
    }

    #[test]
    fn test_concurrent_callers_share_capacity() {
        let limiter = Arc::new(TokenBucketLimiter::new());
        let allowed = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let allowed = Arc::clone(&allowed);
                thread::spawn(move || {
                    for _ in 0..20 {
                        if limiter.allow("shared", 50).unwrap() {
                            allowed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // 50 initial tokens plus at most one refill if the run crossed a second
        let allowed = allowed.load(Ordering::SeqCst);
        assert!((50..=51).contains(&allowed));
    }
}
