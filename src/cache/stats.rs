//! Cache Statistics Module
//!
//! Point-in-time counts and sizes across the cache for observability.

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::entry::{current_timestamp_ms, CacheEntry, EntryMetadata};

// == Cache Stats ==
/// Snapshot of cache occupancy and sizes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total number of tracked entries, expired or not
    pub total_entries: usize,
    /// Entries that have not yet expired
    pub active_entries: usize,
    /// Entries past their expiration but not yet swept
    pub expired_entries: usize,
    /// Sum of serialized entry sizes in bytes
    pub total_size: usize,
    /// Average serialized entry size in bytes (0 when empty)
    pub average_size: usize,
}

impl CacheStats {
    // == Collect ==
    /// Computes a snapshot in a single pass over the entry and metadata maps.
    pub fn collect(
        entries: &HashMap<String, CacheEntry>,
        metadata: &HashMap<String, EntryMetadata>,
    ) -> Self {
        let now = current_timestamp_ms();
        let total_entries = entries.len();
        let mut active_entries = 0;
        let mut expired_entries = 0;
        let mut total_size = 0;

        for (key, entry) in entries {
            if now >= entry.expires_at {
                expired_entries += 1;
            } else {
                active_entries += 1;
            }
            total_size += metadata.get(key).map(|meta| meta.size).unwrap_or(0);
        }

        // Guard against division by zero on an empty cache
        let average_size = if total_entries == 0 {
            0
        } else {
            total_size / total_entries
        };

        Self {
            total_entries,
            active_entries,
            expired_entries,
            total_size,
            average_size,
        }
    }
}
