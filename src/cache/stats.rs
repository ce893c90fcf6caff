//! Cache Statistics Module
//!
//! Tracks cache effectiveness and absorbed failures.

use serde::Serialize;

// == Cache Stats ==
/// Counters maintained by a cache store.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Reads that returned a live payload
    pub hits: u64,
    /// Reads that found nothing usable (absent, expired or unreadable)
    pub misses: u64,
    /// Expired entries removed, lazily on read or by a purge
    pub expirations: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes the substrate rejected
    pub write_failures: u64,
    /// Producer results not cached because they reported failure
    pub skipped: u64,
    /// Entries currently under the store's namespace
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expirations(&mut self, count: u64) {
        self.expirations += count;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
