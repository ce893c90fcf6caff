//! Cache Store Module
//!
//! Read-through TTL cache over an injected storage substrate. Public
//! operations never fail; substrate problems go to the observer.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{
    current_timestamp_ms, sanitize_namespace, CacheEntry, CacheKey, CacheObserver, CacheOp,
    CacheStats, Outcome, Storage, TracingObserver, DEFAULT_NAMESPACE, DEFAULT_TTL_MS,
};
use crate::error::StorageError;

// == Cache Status ==
/// Freshness report for a key, produced without evicting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub exists: bool,
    pub is_expired: bool,
    /// Milliseconds left, zero when absent or expired
    pub remaining_time: u64,
}

impl CacheStatus {
    pub const ABSENT: CacheStatus = CacheStatus {
        exists: false,
        is_expired: false,
        remaining_time: 0,
    };
}

// == Cache Store ==
/// Namespaced cache of timestamped JSON payloads.
pub struct CacheStore {
    /// Persistence substrate, possibly shared with other components
    storage: Arc<dyn Storage>,
    /// Receives absorbed failures and evictions
    observer: Arc<dyn CacheObserver>,
    /// Prefix applied to every key this store owns
    namespace: String,
    /// TTL in milliseconds used when a write gives none
    default_ttl_ms: u64,
    stats: Mutex<CacheStats>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store over `storage` with the default namespace, a 30 minute
    /// default TTL and a tracing observer.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            observer: Arc::new(TracingObserver),
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_ttl_ms: DEFAULT_TTL_MS,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    pub fn with_default_ttl(mut self, ttl_ms: u64) -> Self {
        self.default_ttl_ms = ttl_ms;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = sanitize_namespace(&namespace.into());
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    fn storage_key(&self, key: &str) -> String {
        CacheKey::new(&self.namespace, key).storage_key()
    }

    fn stats_guard(&self) -> MutexGuard<'_, CacheStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, op: CacheOp, key: &str, error: StorageError) {
        self.observer.substrate_error(op, key, &error);
    }

    // == Put ==
    /// Stores `payload` under `key` until `now + ttl`.
    ///
    /// Overwrites any previous entry. Uses the default TTL when `ttl_ms` is
    /// `None`. Failures (quota, disabled storage) are only observed.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, payload: &T, ttl_ms: Option<u64>) {
        let ttl_ms = ttl_ms.unwrap_or(self.default_ttl_ms);

        let written = serde_json::to_value(payload)
            .map(|value| CacheEntry::new(value, ttl_ms))
            .and_then(|entry| entry.to_json())
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set_item(&self.storage_key(key), &raw));

        match written {
            Ok(()) => {
                debug!(key, ttl_ms, "cached payload");
                self.stats_guard().record_write();
            }
            Err(e) => {
                self.stats_guard().record_write_failure();
                self.report(CacheOp::Put, key, e);
            }
        }
    }

    /// Loads and decodes the raw entry for `key`.
    fn read_entry(&self, op: CacheOp, key: &str) -> Option<CacheEntry> {
        let raw = match self.storage.get_item(&self.storage_key(key)) {
            Ok(raw) => raw?,
            Err(e) => {
                self.report(op, key, e);
                return None;
            }
        };

        match CacheEntry::from_json(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                self.report(op, key, e.into());
                None
            }
        }
    }

    /// Removes an entry that was observed expired.
    fn evict(&self, op: CacheOp, key: &str) -> bool {
        match self.storage.remove_item(&self.storage_key(key)) {
            Ok(()) => {
                self.stats_guard().record_expirations(1);
                self.observer.evicted(key);
                true
            }
            Err(e) => {
                self.report(op, key, e);
                false
            }
        }
    }

    // == Get ==
    /// Returns the payload for `key` if a live entry exists.
    ///
    /// An expired entry is removed before `None` is returned. Unreadable or
    /// mismatched payloads also read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.read_entry(CacheOp::Get, key) {
            Some(entry) if entry.is_expired() => {
                self.evict(CacheOp::Get, key);
                None
            }
            Some(entry) => match serde_json::from_value(entry.payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.report(CacheOp::Get, key, e.into());
                    None
                }
            },
            None => None,
        };

        let mut stats = self.stats_guard();
        if value.is_some() {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
        value
    }

    // == Remove ==
    /// Deletes the entry for `key`. Absent keys are fine.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&self.storage_key(key)) {
            self.report(CacheOp::Remove, key, e);
        }
    }

    /// Logical keys currently stored under this namespace.
    fn namespaced_keys(&self, op: CacheOp) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|k| CacheKey::parse(&self.namespace, k).map(|ck| ck.key.to_string()))
                .collect(),
            Err(e) => {
                self.report(op, &self.namespace, e);
                Vec::new()
            }
        }
    }

    // == Clear ==
    /// Deletes every entry under this store's namespace.
    ///
    /// Keys written by anything else into the same substrate are untouched.
    pub fn clear(&self) {
        let keys = self.namespaced_keys(CacheOp::Clear);
        let count = keys.len();

        for key in keys {
            if let Err(e) = self.storage.remove_item(&self.storage_key(&key)) {
                self.report(CacheOp::Clear, &key, e);
            }
        }

        debug!(namespace = %self.namespace, count, "cleared cache");
    }

    // == Status ==
    /// Reports existence, expiry and remaining TTL without evicting.
    pub fn status(&self, key: &str) -> CacheStatus {
        match self.read_entry(CacheOp::Status, key) {
            Some(entry) => {
                let now = current_timestamp_ms();
                let is_expired = entry.is_expired_at(now);
                CacheStatus {
                    exists: true,
                    is_expired,
                    remaining_time: if is_expired {
                        0
                    } else {
                        entry.remaining_ms_at(now)
                    },
                }
            }
            None => CacheStatus::ABSENT,
        }
    }

    // == Read Through ==
    /// Returns the cached value for `key`, or runs `producer` on a miss.
    ///
    /// Only results that report success are stored; failures are handed back
    /// unchanged so the next call tries again. No lock is held while the
    /// producer runs.
    pub async fn read_through<T, F, Fut>(&self, key: &str, ttl_ms: Option<u64>, producer: F) -> T
    where
        T: Outcome + Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(cached) = self.get::<T>(key) {
            debug!(key, "read-through hit");
            return cached;
        }

        debug!(key, "read-through miss, invoking producer");
        let result = producer().await;

        if result.is_success() {
            self.put(key, &result, ttl_ms);
        } else {
            debug!(key, "producer reported failure, not caching");
            self.stats_guard().record_skipped();
        }

        result
    }

    // == Purge Expired ==
    /// Removes every expired entry under the namespace.
    ///
    /// Returns the number of entries removed. Unreadable entries are left in
    /// place.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();

        self.namespaced_keys(CacheOp::Purge)
            .into_iter()
            .filter(|key| {
                self.read_entry(CacheOp::Purge, key)
                    .map(|entry| entry.is_expired_at(now))
                    .unwrap_or(false)
            })
            .filter(|key| self.evict(CacheOp::Purge, key))
            .count()
    }

    // == Length ==
    /// Number of entries under the namespace, expired ones included.
    pub fn len(&self) -> usize {
        self.namespaced_keys(CacheOp::Status).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> CacheStats {
        let total = self.len();
        let mut stats = self.stats_guard().clone();
        stats.set_total_entries(total);
        stats
    }
}
