use dashmap::DashMap;
use std::{
    any::Any,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::Instant;
use tracing::debug;

/// Expiry used when `now + ttl` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Entrada de cache con expiración absoluta
struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new<V: Send + Sync + 'static>(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value: Arc::new(value),
            expires_at: now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    expired_removals: AtomicU64,
}

/// Get-or-create memoization keyed by string, with per-entry TTL and
/// prefix invalidation.
///
/// Values are stored type-erased, so one cache can hold the collection,
/// derived lists and single songs side by side. A lookup whose stored value
/// has a different type than requested is treated as a miss.
///
/// Concurrent misses on the same key may each run their factory; the last
/// writer wins. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct TtlCache {
    data: Arc<DashMap<String, CacheEntry>>,
    counters: Arc<CacheCounters>,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.data.len())
            .field("metrics", &self.metrics())
            .finish()
    }
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value for `key`, or runs `factory`, stores its
    /// output for `ttl` and returns it.
    ///
    /// A failing factory leaves the cache untouched and its error is
    /// returned unchanged.
    pub async fn get_or_create<T, E, F, Fut>(&self, key: &str, ttl: Duration, factory: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key) {
            return Ok(value);
        }

        let value = factory().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.lookup::<T>(key) {
            Some(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit: {}", key);
                Some(value)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss: {}", key);
                None
            }
        }
    }

    pub fn insert<T>(&self, key: &str, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        self.data.insert(key.to_string(), CacheEntry::new(value, ttl));
    }

    /// Removes one entry, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        if removed {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Removes every entry whose key starts with `prefix` and returns how
    /// many were dropped.
    pub fn remove_by_prefix(&self, prefix: &str) -> usize {
        let keys_to_remove: Vec<String> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in keys_to_remove {
            if self.data.remove(&key).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.counters.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Invalidadas {} entradas con prefijo '{}'", removed, prefix);
        }
        removed
    }

    /// Limpia entradas expiradas y retorna el número de elementos removidos
    pub fn cleanup_expired(&self) -> usize {
        let before = self.data.len();
        self.data.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.data.len());

        if removed > 0 {
            self.counters.expired_removals.fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Limpiadas {} entradas expiradas del cache", removed);
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.get(key).is_some_and(|entry| !entry.is_expired())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            expired_removals: self.counters.expired_removals.load(Ordering::Relaxed),
        }
    }

    fn lookup<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.data.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.data.remove_if(key, |_, entry| entry.is_expired());
            self.counters.expired_removals.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        (*entry.value).downcast_ref::<T>().cloned()
    }
}

/// Métricas básicas del cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub expired_removals: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }

    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }
}
