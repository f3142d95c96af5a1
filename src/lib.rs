//! Dashcache - a TTL data cache with a durable persistence tier
//!
//! Sits between an application (typically a dashboard UI) and its remote API:
//! serves repeat reads from memory, keeps a policy-selected subset of entries
//! on durable storage so they survive restarts, sweeps out expired entries in
//! the background, and fills or refreshes entries through caller-supplied
//! async loaders.
//!
//! The cache is an explicit object owned by the application's composition
//! root; nothing here is process-global. The embedding application also owns
//! the tracing subscriber and the [`CleanupScheduler`] lifecycle.

pub mod cache;
pub mod config;
pub mod error;
pub mod persist;
pub mod preload;
pub mod tasks;

pub use cache::{generate_key, CacheHit, CacheStats, DataCache, GetOptions};
pub use config::Config;
pub use error::PersistError;
pub use persist::{
    persist_nothing, prefix_policy, FileBackend, MemoryBackend, PersistedRecord,
    PersistencePolicy, PersistentStore,
};
pub use preload::{loader, preload_data, smart_refresh, Loader, PreloadOutcome, RefreshOutcome};
pub use tasks::CleanupScheduler;
