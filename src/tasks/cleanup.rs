//! TTL Cleanup Task
//!
//! Background sweep that periodically removes expired cache entries,
//! cascading to the durable store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::DataCache;
use crate::config::Config;

// == Cleanup Scheduler ==
/// Owns the recurring sweep over a shared cache.
///
/// The timer is started explicitly and must be stopped (or the scheduler
/// dropped) on teardown, so an embedding application or test controls its
/// lifetime deterministically and no task is leaked.
#[derive(Debug)]
pub struct CleanupScheduler {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl CleanupScheduler {
    // == Constructor ==
    /// Creates a stopped scheduler sweeping at the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Creates a stopped scheduler sweeping at the configured interval.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_secs(config.cleanup_interval_secs))
    }

    // == Start ==
    /// Spawns the sweep loop. The task sleeps for the configured interval
    /// between runs and acquires a write lock on the cache to remove expired
    /// entries. Starting an already-running scheduler is a no-op.
    pub fn start(&mut self, cache: Arc<RwLock<DataCache>>) {
        if self.handle.is_some() {
            warn!("Cleanup scheduler already running");
            return;
        }

        let interval = self.interval;
        self.handle = Some(tokio::spawn(async move {
            info!("Starting cleanup sweep with interval of {:?}", interval);

            loop {
                tokio::time::sleep(interval).await;

                let removed = {
                    let mut cache = cache.write().await;
                    cache.cleanup_expired()
                };

                if removed > 0 {
                    info!("Cleanup sweep removed {} expired entries", removed);
                } else {
                    debug!("Cleanup sweep found no expired entries");
                }
            }
        }));
    }

    // == Stop ==
    /// Aborts the sweep loop if running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cleanup scheduler stopped");
        }
    }

    /// Returns true while the sweep task is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shared_cache() -> Arc<RwLock<DataCache>> {
        Arc::new(RwLock::new(DataCache::memory_only(&Config::default())))
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let cache = shared_cache();
        {
            let mut cache = cache.write().await;
            cache.set("expire_soon", json!("v"), Some(50));
        }

        let mut scheduler = CleanupScheduler::new(Duration::from_millis(100));
        scheduler.start(cache.clone());

        tokio::time::sleep(Duration::from_millis(300)).await;

        {
            let cache = cache.read().await;
            assert_eq!(cache.len(), 0, "Expired entry should have been swept");
        }

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_from_config_interval_drives_sweep() {
        let cache = shared_cache();
        {
            let mut cache = cache.write().await;
            cache.set("expire_soon", json!("v"), Some(50));
        }

        let config = Config {
            cleanup_interval_secs: 1,
            ..Config::default()
        };
        let mut scheduler = CleanupScheduler::from_config(&config);
        scheduler.start(cache.clone());

        // Wait for the entry to expire and the configured sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        {
            let cache = cache.read().await;
            assert_eq!(cache.len(), 0, "Expired entry should have been swept");
        }

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let cache = shared_cache();
        {
            let mut cache = cache.write().await;
            cache.set("long_lived", json!("v"), Some(60_000));
        }

        let mut scheduler = CleanupScheduler::new(Duration::from_millis(50));
        scheduler.start(cache.clone());

        tokio::time::sleep(Duration::from_millis(200)).await;

        {
            let mut cache = cache.write().await;
            assert!(cache.get("long_lived").is_some(), "Valid entry should remain");
        }

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_stop_is_deterministic() {
        let mut scheduler = CleanupScheduler::new(Duration::from_millis(50));
        scheduler.start(shared_cache());
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());

        // Stopping again is harmless
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let cache = shared_cache();
        let mut scheduler = CleanupScheduler::new(Duration::from_millis(50));
        scheduler.start(cache.clone());
        scheduler.start(cache);

        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let cache = shared_cache();
        {
            let mut scheduler = CleanupScheduler::new(Duration::from_millis(50));
            scheduler.start(cache.clone());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        {
            let mut cache = cache.write().await;
            cache.set("dead", json!(1), Some(0));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        // No sweep ran after the scheduler was dropped, so the expired entry
        // is still tracked
        let cache = cache.read().await;
        assert_eq!(cache.len(), 1);
    }
}
