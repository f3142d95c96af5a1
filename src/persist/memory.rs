//! Memory Backend
//!
//! An in-process durable-store stand-in backed by a shared map. Cloning the
//! backend shares the underlying map, so tests can hand the same backend to a
//! fresh cache instance to simulate a restart; it also serves targets with no
//! durable storage at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::persist::backend::{PersistedRecord, PersistentStore};

// == Memory Backend ==
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, PersistedRecord>>>,
    namespace: String,
}

impl MemoryBackend {
    // == Constructor ==
    pub fn new(namespace: &str) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            namespace: namespace.to_string(),
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().expect("backend mutex poisoned").len()
    }

    /// Returns true when no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStore for MemoryBackend {
    fn write(&self, key: &str, record: &PersistedRecord) -> Result<()> {
        let mut records = self.records.lock().expect("backend mutex poisoned");
        records.insert(self.storage_key(key), record.clone());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<PersistedRecord>> {
        let records = self.records.lock().expect("backend mutex poisoned");
        Ok(records.get(&self.storage_key(key)).cloned())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock().expect("backend mutex poisoned");
        records.remove(&self.storage_key(key));
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<(String, PersistedRecord)>> {
        let records = self.records.lock().expect("backend mutex poisoned");
        let prefix = format!("{}_", self.namespace);

        Ok(records
            .iter()
            .filter_map(|(storage_key, record)| {
                storage_key
                    .strip_prefix(&prefix)
                    .map(|key| (key.to_string(), record.clone()))
            })
            .collect())
    }
}
