//! Preload Module
//!
//! Loader-driven cache population: preload for missing entries, smart refresh
//! for stale ones.

mod engine;

pub use engine::{loader, preload_data, smart_refresh, Loader, PreloadOutcome, RefreshOutcome};
