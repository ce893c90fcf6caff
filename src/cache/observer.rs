//! Cache Observer Module
//!
//! Side channel for events the store absorbs instead of returning.

use std::fmt;

use tracing::{debug, warn};

use crate::error::StorageError;

// == Cache Operation ==
/// The store operation during which an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Put,
    Get,
    Remove,
    Clear,
    Status,
    Purge,
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheOp::Put => "put",
            CacheOp::Get => "get",
            CacheOp::Remove => "remove",
            CacheOp::Clear => "clear",
            CacheOp::Status => "status",
            CacheOp::Purge => "purge",
        };
        f.write_str(name)
    }
}

// == Observer Trait ==
/// Receives substrate failures and evictions from a cache store.
pub trait CacheObserver: Send + Sync {
    /// A substrate call failed; the operation degraded to a miss or no-op.
    fn substrate_error(&self, op: CacheOp, key: &str, error: &StorageError);

    /// An expired entry was removed.
    fn evicted(&self, _key: &str) {}
}

// == Tracing Observer ==
/// Default observer, logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn substrate_error(&self, op: CacheOp, key: &str, error: &StorageError) {
        warn!(%op, key, %error, "cache storage operation failed");
    }

    fn evicted(&self, key: &str) {
        debug!(key, "evicted expired cache entry");
    }
}
