//! Burst-aware sliding window admission limiter

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::rate_limit::{
    require_positive_limit, AdmissionStats, BurstAdmissionLimiter, GlobalAdmissionStats,
    RateLimitConfig, SlidingWindowBucket,
};
use crate::domain::traits::Sweep;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_admission, record_sweep};

use super::BucketRegistry;

const LIMITER_NAME: &str = "sliding_window";

/// Token bucket limiter that also caps admissions per trailing minute
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    registry: BucketRegistry<SlidingWindowBucket>,
    global: Mutex<GlobalAdmissionStats>,
    inactive_after: Duration,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self {
            registry: BucketRegistry::new(),
            global: Mutex::new(GlobalAdmissionStats::default()),
            inactive_after: RateLimitConfig::default().inactive_after(),
        }
    }

    pub fn with_config(config: &RateLimitConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            inactive_after: config.inactive_after(),
            ..Self::new()
        })
    }

    fn record(&self, allowed: bool) -> Result<(), DomainError> {
        self.global
            .lock()
            .map_err(DomainError::poisoned)?
            .record(allowed);
        record_admission(LIMITER_NAME, allowed);
        Ok(())
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl BurstAdmissionLimiter for SlidingWindowLimiter {
    fn allow_with_burst(
        &self,
        identifier: &str,
        rate_limit: u32,
        burst_limit: u32,
    ) -> Result<bool, DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;
        require_positive_limit("rate_limit", rate_limit)?;
        require_positive_limit("burst_limit", burst_limit)?;

        let allowed = self.registry.with_bucket(
            identifier,
            || SlidingWindowBucket::new(rate_limit, burst_limit, Instant::now()),
            |bucket| bucket.try_admit(Instant::now()),
        )?;

        self.record(allowed)?;
        if !allowed {
            tracing::debug!(identifier = %identifier, "Request throttled by burst limiter");
        }

        Ok(allowed)
    }

    fn remaining_tokens(&self, identifier: &str) -> Result<Option<u32>, DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;

        self.registry
            .with_existing(identifier, |bucket| bucket.remaining(Instant::now()))
    }

    fn set_limits(
        &self,
        identifier: &str,
        rate_limit: u32,
        burst_limit: u32,
    ) -> Result<(), DomainError> {
        DomainError::require_non_empty("identifier", identifier)?;
        require_positive_limit("rate_limit", rate_limit)?;
        require_positive_limit("burst_limit", burst_limit)?;

        self.registry.with_bucket(
            identifier,
            || SlidingWindowBucket::new(rate_limit, burst_limit, Instant::now()),
            |bucket| bucket.set_limits(rate_limit, burst_limit),
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

    fn global_stats(&self) -> Result<GlobalAdmissionStats, DomainError> {
        Ok(*self.global.lock().map_err(DomainError::poisoned)?)
    }

    fn reset_global_stats(&self) -> Result<(), DomainError> {
        *self.global.lock().map_err(DomainError::poisoned)? = GlobalAdmissionStats::default();
        Ok(())
    }
}

impl Sweep for SlidingWindowLimiter {
    fn sweep_name(&self) -> &'static str {
        LIMITER_NAME
    }

    fn sweep(&self) -> Result<usize, DomainError> {
        let removed = self.cleanup_inactive(self.inactive_after)?;
        record_sweep(LIMITER_NAME, removed);
        Ok(removed)
    }
}
