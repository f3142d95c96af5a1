//! Cache Store Module
//!
//! Main cache engine combining the in-memory hot path with the durable
//! persistence tier: TTL expiry, access stats, pattern invalidation, and
//! startup hydration.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::entry::{current_timestamp_ms, CacheEntry, EntryMetadata};
use crate::cache::stats::CacheStats;
use crate::config::Config;
use crate::persist::{MemoryBackend, PersistedRecord, PersistencePolicy, PersistentStore};

// == Get Options ==
/// Per-call read behavior.
#[derive(Debug, Clone, Copy)]
pub struct GetOptions {
    /// Return expired entries instead of deleting them
    pub allow_expired: bool,
    /// Bump the entry's access statistics
    pub update_access: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            allow_expired: false,
            update_access: true,
        }
    }
}

// == Cache Hit ==
/// A successful read: the data plus derived freshness information.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub data: Value,
    pub is_expired: bool,
    /// Milliseconds since the entry was created
    pub age_ms: u64,
    pub access_count: u64,
}

// == Data Cache ==
/// TTL cache over an in-memory map, with a policy-selected subset of entries
/// mirrored to a durable backend so they survive restarts.
///
/// A single instance owns its maps; all mutation goes through `&mut self`.
/// There is no coordination between instances sharing a durable backend:
/// concurrent writers to the same persisted key race and the last writer
/// wins.
pub struct DataCache {
    /// Key-value hot path
    entries: HashMap<String, CacheEntry>,
    /// Parallel bookkeeping for statistics and TTL updates
    metadata: HashMap<String, EntryMetadata>,
    /// Durable storage backend
    persist: Box<dyn PersistentStore>,
    /// Which keys get a durable copy
    policy: PersistencePolicy,
    /// TTL applied when a set supplies none
    default_ttl_ms: u64,
    /// Set after a quota failure; durable writes pause until space is freed
    degraded: bool,
}

impl DataCache {
    // == Constructor ==
    /// Creates a cache over the given backend and policy, hydrating unexpired
    /// persisted records into memory.
    pub fn new(
        config: &Config,
        persist: Box<dyn PersistentStore>,
        policy: PersistencePolicy,
    ) -> Self {
        let mut cache = Self {
            entries: HashMap::new(),
            metadata: HashMap::new(),
            persist,
            policy,
            default_ttl_ms: config.default_ttl_ms,
            degraded: false,
        };
        cache.hydrate();
        cache
    }

    /// Creates a cache with no durable tier.
    pub fn memory_only(config: &Config) -> Self {
        Self::new(
            config,
            Box::new(MemoryBackend::new(&config.namespace)),
            crate::persist::persist_nothing(),
        )
    }

    // == Hydration ==
    /// Loads unexpired records from the durable store; expired records are
    /// removed from it and not loaded.
    fn hydrate(&mut self) {
        let records = match self.persist.scan_all() {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Failed to scan persistent store, starting cold");
                return;
            }
        };

        let now = current_timestamp_ms();
        let mut loaded = 0;
        let mut dropped = 0;

        for (key, record) in records {
            if now >= record.expires_at {
                self.remove_persisted(&key);
                dropped += 1;
                continue;
            }

            self.admit_record(&key, record);
            loaded += 1;
        }

        if loaded > 0 || dropped > 0 {
            info!(loaded, dropped, "Hydrated cache from persistent store");
        }
    }

    /// Inserts a persisted record into memory, reconstructing its metadata
    /// (size recomputed, TTL derived from the stored timestamps).
    fn admit_record(&mut self, key: &str, record: PersistedRecord) {
        let ttl_ms = record.expires_at.saturating_sub(record.created_at);
        let entry = CacheEntry::from(record);
        self.metadata
            .insert(key.to_string(), EntryMetadata::for_entry(&entry, ttl_ms));
        self.entries.insert(key.to_string(), entry);
    }

    /// Memory-miss fallback: pulls a single key from the durable store.
    /// Unreadable records are dropped and treated as misses.
    fn hydrate_one(&mut self, key: &str) {
        match self.persist.read(key) {
            Ok(Some(record)) => self.admit_record(key, record),
            Ok(None) => {}
            Err(err) => {
                warn!(key, error = %err, "Dropping unreadable persisted record");
                self.remove_persisted(key);
            }
        }
    }

    // == Set ==
    /// Stores a value under `key` with the given TTL (default TTL when None).
    ///
    /// The in-memory write always succeeds. If the persistence policy matches
    /// the key, the entry is also written durably; persistence failure is
    /// logged and never fails this call.
    pub fn set(&mut self, key: &str, data: Value, ttl_ms: Option<u64>) -> bool {
        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        let entry = CacheEntry::new(data, ttl);
        let meta = EntryMetadata::for_entry(&entry, ttl);

        self.persist_if_selected(key, &entry);
        self.entries.insert(key.to_string(), entry);
        self.metadata.insert(key.to_string(), meta);
        true
    }

    fn persist_if_selected(&mut self, key: &str, entry: &CacheEntry) {
        if !(self.policy)(key) {
            return;
        }
        if self.degraded {
            debug!(key, "Skipping durable write while store is full");
            return;
        }

        let record = PersistedRecord::from(entry);
        if let Err(err) = self.persist.write(key, &record) {
            if err.is_quota() {
                self.degraded = true;
                warn!(key, error = %err, "Durable store full, pausing persistence");
            } else {
                warn!(key, error = %err, "Durable write failed, entry kept in memory only");
            }
        }
    }

    fn remove_persisted(&mut self, key: &str) {
        match self.persist.remove(key) {
            Ok(()) => {
                if self.degraded {
                    self.degraded = false;
                    info!("Durable store freed space, resuming persistence");
                }
            }
            Err(err) => warn!(key, error = %err, "Failed to remove persisted record"),
        }
    }

    // == Get ==
    /// Retrieves a value by key with default options: expired entries are
    /// deleted and reported as misses, access statistics are updated.
    pub fn get(&mut self, key: &str) -> Option<CacheHit> {
        self.get_with(key, GetOptions::default())
    }

    /// Retrieves a value by key.
    ///
    /// Falls back to the durable store when the key is absent in memory. An
    /// expired entry is deleted and reported as a miss unless `allow_expired`
    /// is set, in which case it is returned with `is_expired: true`.
    pub fn get_with(&mut self, key: &str, opts: GetOptions) -> Option<CacheHit> {
        if !self.entries.contains_key(key) {
            self.hydrate_one(key);
        }

        let now = current_timestamp_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => now >= entry.expires_at,
            None => {
                debug!(key, "Cache miss");
                return None;
            }
        };

        if expired && !opts.allow_expired {
            debug!(key, "Entry expired on access, removing");
            self.entries.remove(key);
            self.metadata.remove(key);
            self.remove_persisted(key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        if opts.update_access {
            entry.touch();
        }

        Some(CacheHit {
            data: entry.data.clone(),
            is_expired: expired,
            age_ms: now.saturating_sub(entry.created_at),
            access_count: entry.access_count,
        })
    }

    // == Has ==
    /// Returns true when the key holds an unexpired entry. Does not update
    /// access statistics.
    pub fn has(&mut self, key: &str) -> bool {
        self.get_with(
            key,
            GetOptions {
                allow_expired: false,
                update_access: false,
            },
        )
        .is_some()
    }

    // == Delete ==
    /// Removes an entry, its metadata, and its persisted record if any.
    /// Returns true when an in-memory entry existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        self.metadata.remove(key);
        self.remove_persisted(key);
        existed
    }

    // == Clear ==
    /// Removes all entries from memory, metadata, and the durable store.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.metadata.clear();

        match self.persist.scan_all() {
            Ok(records) => {
                for (key, _) in records {
                    self.remove_persisted(&key);
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to enumerate persisted records during clear")
            }
        }

        debug!(count, "Cache cleared");
    }

    // == Keys ==
    /// Snapshot of currently tracked keys; may include expired keys the
    /// sweeper has not visited yet.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Invalidate Pattern ==
    /// Deletes every key matching the regular expression and returns the
    /// count removed. An invalid pattern is logged and removes nothing.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => {
                warn!(pattern, error = %err, "Invalid invalidation pattern");
                return 0;
            }
        };

        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| re.is_match(key))
            .cloned()
            .collect();
        let count = matching.len();

        for key in matching {
            self.entries.remove(&key);
            self.metadata.remove(&key);
            self.remove_persisted(&key);
        }

        if count > 0 {
            debug!(pattern, count, "Invalidated keys by pattern");
        }
        count
    }

    // == Update TTL ==
    /// Recomputes the entry's expiry as `now + new_ttl_ms` and re-persists it
    /// if the policy matches. Returns false when the key does not exist.
    pub fn update_ttl(&mut self, key: &str, new_ttl_ms: u64) -> bool {
        let now = current_timestamp_ms();
        let snapshot = match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = now.saturating_add(new_ttl_ms);
                entry.clone()
            }
            None => return false,
        };

        if let Some(meta) = self.metadata.get_mut(key) {
            meta.ttl_ms = new_ttl_ms;
        }

        self.persist_if_selected(key, &snapshot);
        true
    }

    // == Cleanup Expired ==
    /// The sweep: removes all expired entries, cascading to the durable
    /// store. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.metadata.remove(&key);
            self.remove_persisted(&key);
        }

        count
    }

    // == Stats ==
    /// Returns a point-in-time statistics snapshot.
    pub fn get_stats(&self) -> CacheStats {
        CacheStats::collect(&self.entries, &self.metadata)
    }

    // == Length ==
    /// Returns the current number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
