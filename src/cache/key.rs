//! Cache Key Module
//!
//! Two-part keys: a store namespace plus the caller's logical key. The parts
//! are joined with a separator that never appears in a namespace, so one
//! namespace can never claim another's entries even if its name is a prefix.

use std::fmt;

/// Namespace applied to every weather cache entry.
pub const DEFAULT_NAMESPACE: &str = "weather_cache";

/// Joins namespace and logical key in the substrate (ASCII unit separator).
pub const KEY_SEPARATOR: char = '\u{1f}';

// == Cache Key ==
/// A logical cache key scoped to a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey<'a> {
    pub namespace: &'a str,
    pub key: &'a str,
}

impl<'a> CacheKey<'a> {
    pub fn new(namespace: &'a str, key: &'a str) -> Self {
        Self { namespace, key }
    }

    /// Flat key used in the substrate.
    pub fn storage_key(&self) -> String {
        format!("{}{}{}", self.namespace, KEY_SEPARATOR, self.key)
    }

    /// Recovers the logical key from a substrate key, if it belongs to
    /// exactly `namespace`.
    pub fn parse(namespace: &'a str, storage_key: &'a str) -> Option<Self> {
        storage_key
            .split_once(KEY_SEPARATOR)
            .filter(|(ns, _)| *ns == namespace)
            .map(|(_, key)| Self { namespace, key })
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

/// Drops separator characters so a namespace always parses back whole.
pub fn sanitize_namespace(namespace: &str) -> String {
    namespace.replace(KEY_SEPARATOR, "")
}

// == Key Construction ==
/// Combines a semantic scope (e.g. a city) and a data kind into a logical key.
pub fn generate_cache_key(scope: &str, kind: &str) -> String {
    format!("{}_{}", scope, kind)
}
