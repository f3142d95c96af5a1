//! Persistence Port
//!
//! The small storage interface the cache writes through, so durable backends
//! can be swapped per target platform (file-based, in-process, or none).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheEntry;
use crate::error::Result;

// == Persisted Record ==
/// Durable form of a cache entry, serialized as JSON text under a namespaced
/// storage key (`"<namespace>_<key>"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub data: Value,
    pub created_at: u64,
    pub expires_at: u64,
    pub last_accessed_at: u64,
    pub access_count: u64,
}

impl From<&CacheEntry> for PersistedRecord {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            data: entry.data.clone(),
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            last_accessed_at: entry.last_accessed_at,
            access_count: entry.access_count,
        }
    }
}

impl From<PersistedRecord> for CacheEntry {
    fn from(record: PersistedRecord) -> Self {
        Self {
            data: record.data,
            created_at: record.created_at,
            expires_at: record.expires_at,
            last_accessed_at: record.last_accessed_at,
            access_count: record.access_count,
        }
    }
}

// == Persistent Store Trait ==
/// Durable key-value substrate holding the policy-selected subset of entries.
///
/// Keys passed in are the cache's own keys; each backend applies its
/// namespace prefix internally.
pub trait PersistentStore: Send + Sync {
    /// Writes a record under `key`, replacing any previous one.
    fn write(&self, key: &str, record: &PersistedRecord) -> Result<()>;

    /// Reads the record for `key`, if present.
    fn read(&self, key: &str) -> Result<Option<PersistedRecord>>;

    /// Removes the record for `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Enumerates every record in this store's namespace.
    fn scan_all(&self) -> Result<Vec<(String, PersistedRecord)>>;
}

// == Persistence Policy ==
/// Pure predicate over the key namespace deciding which entries also get a
/// durable copy.
pub type PersistencePolicy = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Persists keys starting with any of the given prefixes, the usual shape of
/// "this data category is worth surviving a restart".
pub fn prefix_policy(prefixes: Vec<String>) -> PersistencePolicy {
    Arc::new(move |key: &str| prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())))
}

/// Persists nothing; for memory-only caches.
pub fn persist_nothing() -> PersistencePolicy {
    Arc::new(|_: &str| false)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_layout_is_camel_case() {
        let record = PersistedRecord {
            data: json!({"rows": 3}),
            created_at: 1_000,
            expires_at: 2_000,
            last_accessed_at: 1_500,
            access_count: 7,
        };

        let text = serde_json::to_string(&record).unwrap();
        assert!(text.contains("\"createdAt\":1000"));
        assert!(text.contains("\"expiresAt\":2000"));
        assert!(text.contains("\"lastAccessedAt\":1500"));
        assert!(text.contains("\"accessCount\":7"));
    }

    #[test]
    fn test_entry_record_conversion_preserves_fields() {
        let entry = CacheEntry::new(json!([1, 2]), 60_000);
        let record = PersistedRecord::from(&entry);
        let back = CacheEntry::from(record);

        assert_eq!(back.data, entry.data);
        assert_eq!(back.created_at, entry.created_at);
        assert_eq!(back.expires_at, entry.expires_at);
        assert_eq!(back.access_count, entry.access_count);
    }

    #[test]
    fn test_prefix_policy() {
        let policy = prefix_policy(vec!["dashboard".to_string(), "reports".to_string()]);
        assert!(policy("dashboard-a"));
        assert!(policy("reports-c"));
        assert!(!policy("session-token"));
    }

    #[test]
    fn test_persist_nothing() {
        let policy = persist_nothing();
        assert!(!policy("dashboard-a"));
    }
}
