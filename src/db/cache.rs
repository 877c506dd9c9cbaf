use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// In-memory, time-bounded cache for generated query lists.
///
/// Entries expire a fixed TTL after insertion, regardless of access pattern.
/// The cache is capacity-bounded: inserting into a full cache first drops
/// expired entries, then the oldest-inserted entry.
#[derive(Clone)]
pub struct QueryCache<V> {
    inner: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
    capacity: usize,
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    expires_at: Instant,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            capacity,
        }
    }

    /// Retrieves a value from the cache by key.
    ///
    /// Returns `None` when the key is absent or its entry has expired;
    /// expired values are never returned.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.inner.read().await;
        let entry = entries.get(key)?;

        if entry.expires_at <= Instant::now() {
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }

        Some(entry.value.clone())
    }

    /// Stores a value with a fresh expiry stamped from now.
    pub async fn insert(&self, key: String, value: V) {
        let now = Instant::now();
        let mut entries = self.inner.write().await;

        entries.retain(|_, entry| entry.expires_at > now);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = %oldest, "Evicting oldest cache entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// A macro to simplify cache-fronted computation.
///
/// Checks the cache for a value under `$key`. If found, returns the cached
/// value. If not, executes the provided block to compute the value, stores
/// it in the cache, and then returns the computed value.
///
/// # Arguments
/// * `$cache`: The cache instance, with `get` and `insert` methods.
/// * `$key`: The key (`&str`) under which the value is cached.
/// * `$block`: The async block to execute on a cache miss.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        if let Some(cached) = $cache.get($key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.insert($key.to_string(), value.clone()).await;
            Ok(value)
        }
    }};
}
