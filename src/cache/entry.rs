//! Cache Entry Module
//!
//! Defines the persisted shape of a cache entry and its expiry rules.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cached payload with an absolute expiry.
///
/// Serialized into the substrate as `{"data": ..., "expiryTime": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload, opaque to the store
    #[serde(rename = "data")]
    pub payload: Value,
    /// Expiration timestamp (Unix milliseconds)
    #[serde(rename = "expiryTime")]
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl_ms` milliseconds from now.
    pub fn new(payload: Value, ttl_ms: u64) -> Self {
        Self::new_at(payload, ttl_ms, current_timestamp_ms())
    }

    /// Creates an entry that expires `ttl_ms` milliseconds after `now`.
    pub fn new_at(payload: Value, ttl_ms: u64, now: u64) -> Self {
        Self {
            payload,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a TTL that has fully
    /// elapsed is never served.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Checks whether the entry is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds at `now`, zero once expired.
    pub fn remaining_ms_at(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    // == Encoding ==
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as zero.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new_at(json!({"temp": 20}), 1_000, 5_000);

        assert_eq!(entry.payload, json!({"temp": 20}));
        assert_eq!(entry.expires_at, 6_000);
        assert!(!entry.is_expired_at(5_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new_at(json!(1), 100, 1_000);

        assert!(!entry.is_expired_at(1_099));
        assert!(entry.is_expired_at(1_100), "Entry should be expired at boundary");
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(json!("x"), 0);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_remaining_ms() {
        let entry = CacheEntry::new_at(json!(null), 10_000, 0);

        assert_eq!(entry.remaining_ms_at(2_500), 7_500);
        assert_eq!(entry.remaining_ms_at(10_000), 0);
        assert_eq!(entry.remaining_ms_at(20_000), 0);
    }

    #[test]
    fn test_ttl_overflow_saturates() {
        let entry = CacheEntry::new_at(json!(null), u64::MAX, 10);
        assert_eq!(entry.expires_at, u64::MAX);
    }

    #[test]
    fn test_entry_expiration_over_time() {
        let entry = CacheEntry::new(json!("short"), 50);
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_wire_format() {
        let entry = CacheEntry::new_at(json!({"success": true}), 1_000, 1_000);
        let raw = entry.to_json().unwrap();

        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["data"], json!({"success": true}));
        assert_eq!(parsed["expiryTime"], json!(2_000));

        assert_eq!(CacheEntry::from_json(&raw).unwrap(), entry);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(CacheEntry::from_json("not json").is_err());
        assert!(CacheEntry::from_json(r#"{"data": 1}"#).is_err());
    }
}
