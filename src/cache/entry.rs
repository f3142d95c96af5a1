//! Cache Entry Module
//!
//! Defines the per-key value object with TTL support, plus the parallel
//! metadata record used for statistics and TTL bookkeeping.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A single cached value with its timing and access statistics.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value (consumer-defined shape)
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds); always >= created_at
    pub expires_at: u64,
    /// Timestamp of the most recent read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Number of reads over the entry's lifetime
    pub access_count: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_ms` from now.
    ///
    /// The expiry saturates at the maximum timestamp, so an oversized TTL
    /// means "effectively never" rather than wrapping below `created_at`.
    pub fn new(data: Value, ttl_ms: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            data,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            last_accessed_at: now,
            access_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current
    /// time is greater than or equal to the expiration time, so once the TTL
    /// duration has fully elapsed the entry is immediately expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Age ==
    /// Returns the entry's age in milliseconds since creation.
    ///
    /// Saturates at zero under clock skew.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }

    // == Touch ==
    /// Records a read: bumps the access count and the last-accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = current_timestamp_ms();
        self.access_count += 1;
    }
}

// == Entry Metadata ==
/// Bookkeeping kept alongside each entry, keyed identically.
///
/// Feeds statistics and TTL updates only; expiry decisions always come from
/// the entry's own `expires_at`.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    /// Serialized byte length of the entry's data
    pub size: usize,
    /// Configured TTL in milliseconds
    pub ttl_ms: u64,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
}

impl EntryMetadata {
    /// Builds the metadata record for an entry with the given configured TTL.
    pub fn for_entry(entry: &CacheEntry, ttl_ms: u64) -> Self {
        Self {
            size: serialized_size(&entry.data),
            ttl_ms,
            created_at: entry.created_at,
        }
    }
}

/// Serialized byte length of a value.
///
/// `Value` map keys are always strings, so serialization cannot fail in
/// practice; a zero size is recorded if it somehow does.
pub fn serialized_size(data: &Value) -> usize {
    serde_json::to_string(data).map(|s| s.len()).unwrap_or(0)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
