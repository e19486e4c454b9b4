//! Single-flight resource caches.
//!
//! Creation is lazy and deduplicated: the first caller for a key runs the
//! factory, concurrent callers for the same key wait on that same creation
//! instead of starting their own. Failed creations are not cached, so the
//! next caller retries. Entries are never evicted.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};

use crate::gpu::ContextId;

/// Cache counters.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that found a finished value.
    pub hits: u64,
    /// Lookups that had to create or wait for a value.
    pub misses: u64,
    /// Factory invocations.
    pub creations: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Keyed single-flight memoization.
pub struct SingleFlight<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    creations: AtomicU64,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            creations: AtomicU64::new(0),
        }
    }

    /// Return the value for `key`, creating it with `init` if needed.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(key).or_insert_with(|| Arc::new(OnceCell::new())))
        };

        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let value = cell
            .get_or_try_init(|| {
                self.creations.fetch_add(1, Ordering::Relaxed);
                init()
            })
            .await?;

        Ok(value.clone())
    }

    /// Finished value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().await;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys ever requested, finished or not.
    pub async fn len(&self) -> usize {
        self.cells.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            creations: self.creations.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Single-flight cache scoped per rendering context.
///
/// GPU objects belong to the context that created them, so the same key
/// on two contexts yields two objects.
pub struct ResourceCache<K, V> {
    inner: SingleFlight<(ContextId, K), V>,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: SingleFlight::new(),
        }
    }

    /// Return the resource for `key` on `context`, creating it once.
    pub async fn get_or_create<F, Fut, E>(&self, context: ContextId, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.inner.get_or_try_init((context, key), factory).await
    }

    pub async fn get(&self, context: ContextId, key: K) -> Option<V> {
        self.inner.get(&(context, key)).await
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }
}

impl<K, V> Default for ResourceCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
