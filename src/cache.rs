//! Optional memoization in front of the pure allocation functions.
//!
//! A cache is an explicit object handed to whoever wants one; nothing in the
//! crate caches behind the caller's back. Results are identical with the cache
//! enabled or disabled.

use crate::config::CacheConfig;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Fixed-capacity LRU cache with per-entry expiry, keyed by a SHA-256 digest
/// of the serialized inputs.
pub struct ComputationCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ComputationCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_seconds),
            enabled: config.enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(&CacheConfig::disabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hex SHA-256 of the JSON encoding of `inputs`.
    pub fn key_for<K: Serialize + ?Sized>(inputs: &K) -> Option<String> {
        let encoded = serde_json::to_vec(inputs).ok()?;
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        Some(format!("{:x}", hasher.finalize()))
    }

    /// Returns the cached value for `inputs` if present and fresh, otherwise
    /// runs `compute` and stores its result.
    pub fn get_or_compute<K, F>(&self, inputs: &K, compute: F) -> V
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        if !self.enabled {
            return compute();
        }
        let Some(key) = Self::key_for(inputs) else {
            tracing::warn!("cache key could not be encoded; computing uncached");
            return compute();
        };

        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get(&key) {
                if entry.is_fresh(Instant::now()) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(key = %key, "cache hit");
                    return entry.value.clone();
                }
            }
            entries.pop(&key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: Instant::now().checked_add(self.ttl),
        };
        self.entries.lock().put(key, entry);
        value
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
