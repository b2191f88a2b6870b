//! Admission limiter traits
//!
//! Callers use these as "admit-before-call": a `false` decision means the
//! backend must not be invoked. Decisions are values, never errors; the
//! only errors are an empty identifier or a zero limit.

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

use super::{AdmissionStats, GlobalAdmissionStats};

/// Per-identifier token bucket limiter
pub trait AdmissionLimiter: Send + Sync {
    /// Consumes one token; creates a full bucket on first use
    fn allow(&self, identifier: &str, rate_limit: u32) -> Result<bool, DomainError> {
        self.allow_n(identifier, rate_limit, 1)
    }

    /// Consumes `n` tokens, all or nothing
    fn allow_n(&self, identifier: &str, rate_limit: u32, n: u32) -> Result<bool, DomainError>;

    /// Refills and reports the balance; `None` for an unknown identifier
    fn remaining_tokens(&self, identifier: &str) -> Result<Option<u32>, DomainError>;

    /// Creates or reconfigures a bucket, clamping its balance down
    fn set_rate_limit(&self, identifier: &str, rate_limit: u32) -> Result<(), DomainError>;

    /// Drops a bucket; returns whether it existed
    fn remove_identifier(&self, identifier: &str) -> Result<bool, DomainError>;

    /// Drops buckets whose last refill is older than `max_age`
    fn cleanup_inactive(&self, max_age: Duration) -> Result<usize, DomainError>;

    fn stats(&self) -> Result<AdmissionStats, DomainError>;
}

/// Token bucket limiter with a per-minute burst cap and global counters
#[cfg_attr(test, automock)]
pub trait BurstAdmissionLimiter: Send + Sync {
    /// Admits iff fewer than `burst_limit` requests were admitted in the
    /// trailing minute and a token is available
    fn allow_with_burst(
        &self,
        identifier: &str,
        rate_limit: u32,
        burst_limit: u32,
    ) -> Result<bool, DomainError>;

    /// Refills and reports the balance; `None` for an unknown identifier
    fn remaining_tokens(&self, identifier: &str) -> Result<Option<u32>, DomainError>;

    /// Creates or reconfigures a bucket, clamping its balance down
    fn set_limits(
        &self,
        identifier: &str,
        rate_limit: u32,
        burst_limit: u32,
    ) -> Result<(), DomainError>;

    /// Drops a bucket; returns whether it existed
    fn remove_identifier(&self, identifier: &str) -> Result<bool, DomainError>;

    /// Drops buckets whose last refill is older than `max_age`
    fn cleanup_inactive(&self, max_age: Duration) -> Result<usize, DomainError>;

    fn stats(&self) -> Result<AdmissionStats, DomainError>;

    fn global_stats(&self) -> Result<GlobalAdmissionStats, DomainError>;

    fn reset_global_stats(&self) -> Result<(), DomainError>;
}

/// Rejects a zero rate or burst limit
pub fn require_positive_limit(field: &str, value: u32) -> Result<(), DomainError> {
    if value == 0 {
        return Err(DomainError::validation(format!(
            "{} must be positive",
            field
        )));
    }

    Ok(())
}
