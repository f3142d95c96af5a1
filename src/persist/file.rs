//! File Backend
//!
//! Durable storage as one JSON file per key inside a cache directory. The
//! storage key `"<namespace>_<key>"` becomes the file name, with bytes
//! outside the filename-safe set percent-encoded so structured keys (which
//! may contain JSON punctuation) round-trip through the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{PersistError, Result};
use crate::persist::backend::{PersistedRecord, PersistentStore};

// == File Backend ==
/// Persists records as `<dir>/<namespace>_<encoded-key>.json`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    namespace: String,
}

impl FileBackend {
    // == Constructor ==
    /// Creates the backend, creating the cache directory if needed.
    pub fn new(dir: impl Into<PathBuf>, namespace: &str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(PersistError::from_io)?;

        Ok(Self {
            dir,
            namespace: namespace.to_string(),
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", self.namespace, encode_component(key)))
    }

    /// Recovers the cache key from a file name in this backend's namespace,
    /// or None for files that do not belong to it.
    fn key_from_file_name(&self, name: &str) -> Option<String> {
        let stem = name.strip_suffix(".json")?;
        let encoded = stem.strip_prefix(&format!("{}_", self.namespace))?;
        decode_component(encoded)
    }
}

impl PersistentStore for FileBackend {
    fn write(&self, key: &str, record: &PersistedRecord) -> Result<()> {
        let contents = serde_json::to_string(record)?;
        fs::write(self.record_path(key), contents).map_err(PersistError::from_io)
    }

    fn read(&self, key: &str) -> Result<Option<PersistedRecord>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(PersistError::from_io)?;
        let record =
            serde_json::from_str(&contents).map_err(|err| PersistError::Corrupt {
                key: key.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Some(record))
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistError::from_io(err)),
        }
    }

    fn scan_all(&self) -> Result<Vec<(String, PersistedRecord)>> {
        let mut records = Vec::new();

        for dir_entry in fs::read_dir(&self.dir).map_err(PersistError::from_io)? {
            let dir_entry = dir_entry.map_err(PersistError::from_io)?;
            let name = dir_entry.file_name();
            let Some(key) = self.key_from_file_name(&name.to_string_lossy()) else {
                continue;
            };

            match self.read(&key) {
                Ok(Some(record)) => records.push((key, record)),
                Ok(None) => {}
                Err(err) => {
                    // Unparsable records are dropped rather than failing the scan
                    warn!(key, error = %err, "Dropping unreadable persisted record");
                    remove_quietly(&dir_entry.path());
                }
            }
        }

        Ok(records)
    }
}

fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "Failed to remove record file");
    }
}

// == Key Encoding ==
// Filename-safe alphabet; everything else is percent-encoded byte-wise.

fn encode_component(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' | b'.' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_component(encoded: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(encoded.len());
    let mut input = encoded.bytes();

    while let Some(byte) = input.next() {
        if byte == b'%' {
            let hi = input.next()?;
            let lo = input.next()?;
            let hex = [hi, lo];
            let pair = std::str::from_utf8(&hex).ok()?;
            bytes.push(u8::from_str_radix(pair, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }

    String::from_utf8(bytes).ok()
}
