//! Key/value store with per-entry expiry.

use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// An entry is live strictly before its expiry instant.
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A thread-safe TTL cache shared by all callers of one upstream.
///
/// Cloning is cheap and yields a handle to the same map.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    inner: Arc<DashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Get a live value. An expired entry is evicted and reported as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        match self.inner.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        // A concurrent `set` may have refreshed the entry since the read above.
        self.inner.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.inner.insert(key, CacheEntry { value, expires_at });
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether an entry (live or not) is currently stored for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(key)
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
