use async_trait::async_trait;
use lingua::{CacheStore, KeyPattern};
use moka::Expiry;
use moka::future::Cache;
use shared::{Error, Result, TtlMs};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct CachedValue {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based cache store with per-entry TTL and optional size bound
pub struct MokaCacheStore {
    cache: Cache<String, CachedValue>,
}

impl MokaCacheStore {
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(PerEntryTtl);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Collect every matching key in a single pass over the cache. The scan
    /// runs on the blocking pool so a large key space never stalls the
    /// async workers.
    async fn matching_keys(&self, pattern: &KeyPattern) -> Result<Vec<Arc<String>>> {
        let cache = self.cache.clone();
        let pattern = pattern.clone();

        tokio::task::spawn_blocking(move || {
            cache
                .iter()
                .map(|(key, _)| key)
                .filter(|key| pattern.matches(key))
                .collect()
        })
        .await
        .map_err(|e| Error::Cache(format!("Key scan failed: {}", e)))
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .cache
            .get(key)
            .await
            .map(|value| value.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: TtlMs) -> Result<()> {
        let value = CachedValue {
            payload: value.into(),
            ttl: ttl.as_duration(),
        };
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn remove_matching(&self, pattern: &KeyPattern, batch_size: usize) -> Result<u64> {
        let keys = self.matching_keys(pattern).await?;
        let mut removed = 0;

        for batch in keys.chunks(batch_size.max(1)) {
            for key in batch {
                if self.cache.remove(key.as_str()).await.is_some() {
                    removed += 1;
                }
            }
            tokio::task::yield_now().await;
        }

        debug!("Removed {} key(s) matching '{}'", removed, pattern);
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

impl Debug for MokaCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheStore")
            .field("name", &self.cache.name())
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
