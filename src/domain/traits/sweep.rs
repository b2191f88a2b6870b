//! Periodic maintenance hook implemented by caches and limiters

use crate::domain::DomainError;

/// A component that can drop stale state on demand
///
/// Managers never schedule themselves; a caller-owned task decides when
/// sweeps run.
pub trait Sweep: Send + Sync {
    /// Short name used in logs and metrics
    fn sweep_name(&self) -> &'static str;

    /// Removes stale entries; returns how many were removed
    fn sweep(&self) -> Result<usize, DomainError>;
}
