//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use crate::persist::{prefix_policy, PersistencePolicy};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Background cleanup sweep interval in seconds
    pub cleanup_interval_secs: u64,
    /// Namespace prefixed onto persisted storage keys
    pub namespace: String,
    /// Key prefixes whose entries also get a durable copy
    pub persist_prefixes: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CLEANUP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_NAMESPACE` - Storage-key namespace (default: "dashcache")
    /// - `PERSIST_PREFIXES` - Comma-separated persisted-key prefixes
    ///   (default: "dashboard,reports")
    pub fn from_env() -> Self {
        Self {
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            namespace: env::var("CACHE_NAMESPACE").unwrap_or_else(|_| "dashcache".to_string()),
            persist_prefixes: env::var("PERSIST_PREFIXES")
                .map(|v| split_prefixes(&v))
                .unwrap_or_else(|_| vec!["dashboard".to_string(), "reports".to_string()]),
        }
    }

    /// Builds the persistence policy selecting the configured key prefixes.
    pub fn persistence_policy(&self) -> PersistencePolicy {
        prefix_policy(self.persist_prefixes.clone())
    }
}

fn split_prefixes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            cleanup_interval_secs: 60,
            namespace: "dashcache".to_string(),
            persist_prefixes: vec!["dashboard".to_string(), "reports".to_string()],
        }
    }
}
