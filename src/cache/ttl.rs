//! Time-to-live cache keyed by function identity and argument hash.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use super::types::CacheStatus;

/// Key of a memoized call: which function, and a BLAKE3 fingerprint of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: &'static str,
    pub args: [u8; 32],
}

impl CacheKey {
    #[inline]
    pub fn new(function: &'static str, args: [u8; 32]) -> Self {
        Self { function, args }
    }
}

/// In-memory memoization for one function, with expiry on write age.
///
/// Values should be cheap to clone (wrap large results in `Arc`).
pub struct TtlCache<V> {
    function: &'static str,
    ttl: Duration,
    entries: Cache<CacheKey, V>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache for `function` with the given time-to-live and max entry count.
    pub fn new(function: &'static str, ttl: Duration, capacity: u64) -> Self {
        Self {
            function,
            ttl,
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Builds the key for this cache's function.
    #[inline]
    pub fn key(&self, args: [u8; 32]) -> CacheKey {
        CacheKey::new(self.function, args)
    }

    pub async fn get(&self, args: &[u8; 32]) -> Option<V> {
        self.entries.get(&self.key(*args)).await
    }

    pub async fn insert(&self, args: [u8; 32], value: V) {
        self.entries.insert(self.key(args), value).await;
    }

    /// Returns the cached value, or computes, stores and returns a fresh one.
    ///
    /// Concurrent misses on one key run `compute` once; the other callers wait
    /// for its result and report [`CacheStatus::Hit`]. Errors are not cached.
    /// A caller that waited on a failed computation receives the shared error.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        args: [u8; 32],
        compute: F,
    ) -> Result<(V, CacheStatus), Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let entry = self
            .entries
            .entry(self.key(args))
            .or_try_insert_with(compute())
            .await?;

        let status = if entry.is_fresh() {
            CacheStatus::Miss
        } else {
            CacheStatus::Hit
        };
        debug!(function = self.function, cache = %status, "Cache lookup");

        Ok((entry.into_value(), status))
    }

    #[inline]
    pub fn contains(&self, args: &[u8; 32]) -> bool {
        self.entries.contains_key(&self.key(*args))
    }

    pub async fn invalidate(&self, args: &[u8; 32]) {
        self.entries.invalidate(&self.key(*args)).await;
    }

    /// Returns the number of cached entries (approximate until pending tasks run).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V> std::fmt::Debug for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("function", &self.function)
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
