//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of an owning cache.
//!
//! # Tasks
//! - Cleanup sweep: removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::CleanupScheduler;
