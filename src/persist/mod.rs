//! Persistence Module
//!
//! Durable storage tier: the small port interface the cache writes through,
//! the policy deciding which keys are worth persisting, and the backends.

mod backend;
mod file;
mod memory;

// Re-export public types
pub use backend::{
    persist_nothing, prefix_policy, PersistedRecord, PersistencePolicy, PersistentStore,
};
pub use file::FileBackend;
pub use memory::MemoryBackend;
