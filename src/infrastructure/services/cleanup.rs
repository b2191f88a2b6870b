//! Periodic sweeper for caches and limiters

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::domain::traits::Sweep;

/// Background task running every target's sweep on a fixed interval
///
/// The first sweep runs one `interval` after spawning.
#[derive(Debug)]
pub struct CleanupTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Spawns the task on the current tokio runtime
    pub fn spawn(targets: Vec<Arc<dyn Sweep>>, interval: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            info!(
                targets = targets.len(),
                interval_ms = interval.as_millis() as u64,
                "Cleanup task started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_sweeps(&targets);
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Cleanup task stopped");
        });

        Self { shutdown, handle }
    }

    /// Stops the task and waits for the current sweep to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);

        if let Err(e) = self.handle.await {
            error!("Cleanup task failed: {}", e);
        }
    }
}

/// Runs every sweep once; returns the total number of removed entries
pub fn run_sweeps(targets: &[Arc<dyn Sweep>]) -> usize {
    let mut total = 0;

    for target in targets {
        match target.sweep() {
            Ok(removed) => {
                if removed > 0 {
                    debug!(target = target.sweep_name(), removed, "Sweep completed");
                }
                total += removed;
            }
            Err(e) => {
                error!(target = target.sweep_name(), "Sweep failed: {}", e);
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::ExactCache;
    use crate::domain::DomainError;
    use crate::infrastructure::cache::InMemoryExactCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSweep {
        runs: AtomicUsize,
    }

    impl Sweep for CountingSweep {
        fn sweep_name(&self) -> &'static str {
            "counting"
        }

        fn sweep(&self) -> Result<usize, DomainError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        }
    }

    struct FailingSweep;

    impl Sweep for FailingSweep {
        fn sweep_name(&self) -> &'static str {
            "failing"
        }

        fn sweep(&self) -> Result<usize, DomainError> {
            Err(DomainError::internal("boom"))
        }
    }

    #[test]
    fn test_run_sweeps_skips_failures() {
        let counting = Arc::new(CountingSweep::default());
        let targets: Vec<Arc<dyn Sweep>> = vec![Arc::new(FailingSweep), counting.clone()];

        assert_eq!(run_sweeps(&targets), 1);
        assert_eq!(counting.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_task_sweeps_periodically_until_shutdown() {
        let counting = Arc::new(CountingSweep::default());
        let task = CleanupTask::spawn(
            vec![counting.clone() as Arc<dyn Sweep>],
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(110)).await;
        task.shutdown().await;

        let runs = counting.runs.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected at least two sweeps, got {}", runs);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counting.runs.load(Ordering::SeqCst), runs);
    }

    #[tokio::test]
    async fn test_task_removes_expired_cache_entries() {
        let cache = Arc::new(InMemoryExactCache::new());
        cache
            .set("short", 1u32, Duration::from_millis(10))
            .unwrap();

        let task = CleanupTask::spawn(
            vec![cache.clone() as Arc<dyn Sweep>],
            Duration::from_millis(30),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.shutdown().await;

        assert_eq!(cache.stats().unwrap().size, 0);
    }
}
