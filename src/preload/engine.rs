//! Preload & Smart Refresh Engine
//!
//! Orchestrates externally supplied async loaders over a shared cache:
//! preload fills missing entries, smart refresh re-fetches entries that are
//! missing or older than a caller-supplied staleness threshold.
//!
//! Loader calls for distinct keys run concurrently and complete in no
//! guaranteed order. Each key's final state is the result of its own loader;
//! a `set` racing in from elsewhere while loaders are in flight follows
//! last-writer-wins. Loaders own their network I/O, timeouts, and
//! cancellation; the engine simply awaits whatever they return.

use std::collections::HashMap;
use std::future::Future;

use futures::future::{join_all, BoxFuture};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{DataCache, GetOptions};

// == Loader ==
/// A named asynchronous data loader, invoked at most once.
pub type Loader = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<Value>> + Send>;

/// Wraps an async closure into a [`Loader`].
pub fn loader<F, Fut>(f: F) -> Loader
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}

// == Outcomes ==
/// Per-key result of a preload batch.
#[derive(Debug, Clone)]
pub struct PreloadOutcome {
    pub key: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Per-key result of a smart-refresh batch.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub key: String,
    pub refreshed: bool,
    pub error: Option<String>,
}

// == Preload ==
/// Fills any missing cache entries by invoking their loaders concurrently.
///
/// Keys already cached are reported as successes without invoking their
/// loader. A loader failure is recorded in its own outcome and never aborts
/// sibling loaders. Loaded values are stored with the cache's default TTL.
pub async fn preload_data(
    cache: &RwLock<DataCache>,
    loaders: HashMap<String, Loader>,
) -> Vec<PreloadOutcome> {
    let mut outcomes = Vec::with_capacity(loaders.len());
    let mut pending = Vec::new();

    {
        let mut cache = cache.write().await;
        for (key, load) in loaders {
            if cache.has(&key) {
                debug!(key = %key, "Preload skipped, entry already cached");
                outcomes.push(PreloadOutcome {
                    key,
                    success: true,
                    error: None,
                });
            } else {
                pending.push((key, load));
            }
        }
    }

    let results = run_loaders(pending).await;

    let mut cache = cache.write().await;
    for (key, result) in results {
        match result {
            Ok(data) => {
                cache.set(&key, data, None);
                outcomes.push(PreloadOutcome {
                    key,
                    success: true,
                    error: None,
                });
            }
            Err(err) => {
                debug!(key = %key, error = %err, "Preload loader failed");
                outcomes.push(PreloadOutcome {
                    key,
                    success: false,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    outcomes
}

// == Smart Refresh ==
/// Re-invokes loaders for entries that are missing or older than
/// `staleness_threshold_ms`, storing the fresh results.
///
/// Staleness is independent of the entries' own TTLs; it is a separate,
/// typically shorter, freshness window chosen per invocation. Entries fresh
/// enough are skipped with `refreshed: false`. The inspection does not update
/// access statistics.
pub async fn smart_refresh(
    cache: &RwLock<DataCache>,
    loaders: HashMap<String, Loader>,
    staleness_threshold_ms: u64,
) -> Vec<RefreshOutcome> {
    let inspect = GetOptions {
        allow_expired: false,
        update_access: false,
    };

    let mut outcomes = Vec::with_capacity(loaders.len());
    let mut pending = Vec::new();

    {
        let mut cache = cache.write().await;
        for (key, load) in loaders {
            let stale = match cache.get_with(&key, inspect) {
                None => true,
                Some(hit) => hit.age_ms > staleness_threshold_ms,
            };

            if stale {
                pending.push((key, load));
            } else {
                outcomes.push(RefreshOutcome {
                    key,
                    refreshed: false,
                    error: None,
                });
            }
        }
    }

    let results = run_loaders(pending).await;

    let mut cache = cache.write().await;
    for (key, result) in results {
        match result {
            Ok(data) => {
                cache.set(&key, data, None);
                outcomes.push(RefreshOutcome {
                    key,
                    refreshed: true,
                    error: None,
                });
            }
            Err(err) => {
                debug!(key = %key, error = %err, "Refresh loader failed");
                outcomes.push(RefreshOutcome {
                    key,
                    refreshed: false,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    outcomes
}

/// Runs the pending loaders concurrently, pairing each result with its key.
async fn run_loaders(
    pending: Vec<(String, Loader)>,
) -> Vec<(String, anyhow::Result<Value>)> {
    let fetches = pending.into_iter().map(|(key, load)| async move {
        let result = load().await;
        (key, result)
    });

    join_all(fetches).await
}
