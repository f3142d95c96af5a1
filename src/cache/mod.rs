//! Cache Module
//!
//! In-memory TTL caching with a durable persistence tier.

mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, EntryMetadata};
pub use key::generate_key;
pub use stats::CacheStats;
pub use store::{CacheHit, DataCache, GetOptions};
