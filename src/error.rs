//! Error types for the persistence tier
//!
//! Provides unified error handling using thiserror.
//!
//! Persistence failures never propagate to cache callers: the store catches
//! them, logs, and falls back to memory-only behavior. The taxonomy here
//! exists so the store can tell quota exhaustion apart from ordinary I/O
//! failures and corrupt records.

use thiserror::Error;

// Linux errno values for "no space" conditions.
const ENOSPC: i32 = 28;
const EDQUOT: i32 = 122;

// == Persist Error Enum ==
/// Unified error type for the durable storage backends.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Value could not be serialized for durable storage
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable store is out of space
    #[error("Storage quota exceeded: {0}")]
    Quota(std::io::Error),

    /// Underlying storage I/O failed
    #[error("Storage I/O failed: {0}")]
    Io(std::io::Error),

    /// Stored record could not be parsed
    #[error("Corrupt record for key '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl PersistError {
    /// Classifies an I/O error, separating quota exhaustion from other failures.
    pub fn from_io(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(ENOSPC) | Some(EDQUOT) => PersistError::Quota(err),
            _ => PersistError::Io(err),
        }
    }

    /// Returns true for quota exhaustion, which switches the cache to
    /// memory-only writes until space is freed.
    pub fn is_quota(&self) -> bool {
        matches!(self, PersistError::Quota(_))
    }

    /// Returns true for unparsable stored records, which are treated as
    /// misses and removed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, PersistError::Corrupt { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the persistence tier.
pub type Result<T> = std::result::Result<T, PersistError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_classifies_quota() {
        let err = io::Error::from_raw_os_error(ENOSPC);
        assert!(PersistError::from_io(err).is_quota());

        let err = io::Error::from_raw_os_error(EDQUOT);
        assert!(PersistError::from_io(err).is_quota());
    }

    #[test]
    fn test_from_io_other_errors_are_io() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let classified = PersistError::from_io(err);
        assert!(!classified.is_quota());
        assert!(matches!(classified, PersistError::Io(_)));
    }

    #[test]
    fn test_corrupt_display_names_key() {
        let err = PersistError::Corrupt {
            key: "dashboard-a".to_string(),
            reason: "unexpected end of input".to_string(),
        };
        assert!(err.to_string().contains("dashboard-a"));
        assert!(err.is_corrupt());
    }
}
