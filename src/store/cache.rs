//! Small TTL cache: key -> (value, expiry).
//!
//! Replaces the global dict-plus-timestamp caches the service grew over its
//! iterations with one explicit, lock-protected abstraction. Entries are
//! evicted lazily on read; the working set (a handful of remote files) never
//! grows enough to need more.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Thread-safe cache with a fixed per-cache time-to-live.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a value if present and not expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entries = self.entries.read();
        let (value, expires_at) = entries.get(key)?;
        if Instant::now() >= *expires_at {
            return None;
        }
        Some(value.clone())
    }

    /// Insert a value, resetting its expiry to now + ttl.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.write().insert(key, (value, expires_at));
    }

    /// Drop a single entry.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.write().remove(key);
    }

    /// Drop everything, expired or not.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, counting expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove expired entries eagerly.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, (_, exp)| *exp > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_returned() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("KAZ".to_string(), 7);
        assert_eq!(cache.get("KAZ"), Some(7));
        assert_eq!(cache.get("BRT"), None);
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::ZERO);
        cache.insert("KAZ".to_string(), 7);
        assert_eq!(cache.get("KAZ"), None);
        // still physically present until purged
        assert_eq!(cache.len(), 1);
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_resets_expiry() {
        let cache: TtlCache<&'static str, &'static str> =
            TtlCache::new(Duration::from_secs(60));
        cache.insert("k", "old");
        cache.insert("k", "new");
        assert_eq!(cache.get("k"), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        cache.clear();
        assert!(cache.is_empty());
    }
}
