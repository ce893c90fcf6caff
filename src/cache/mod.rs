//! Cache Module
//!
//! Read-through caching with TTL expiration over a pluggable key-value
//! storage substrate.

mod entry;
mod key;
pub mod observer;
mod outcome;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{
    generate_cache_key, sanitize_namespace, CacheKey, DEFAULT_NAMESPACE, KEY_SEPARATOR,
};
pub use observer::{CacheObserver, CacheOp, TracingObserver};
pub use outcome::{ApiResponse, Outcome};
pub use stats::CacheStats;
pub use storage::{FileStorage, MemoryStorage, Storage, DEFAULT_QUOTA_BYTES};
pub use store::{CacheStatus, CacheStore};

// == Public Constants ==
/// Default entry lifetime in milliseconds (30 minutes)
pub const DEFAULT_TTL_MS: u64 = 30 * 60 * 1000;
