use super::KeyPattern;
use crate::ports::CacheStore;
use shared::config::CacheSettings;
use shared::TtlMs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct CacheOptions {
    pub default_ttl: TtlMs,
    /// Upper bound for a single get/set/delete
    pub op_timeout: Duration,
    /// Upper bound for a whole invalidation, retries included
    pub invalidate_timeout: Duration,
    pub scan_batch: usize,
    pub invalidate_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CacheOptions {
    fn from(settings: &CacheSettings) -> Self {
        let op_timeout = Duration::from_millis(settings.op_timeout_ms);
        Self {
            default_ttl: TtlMs::from_secs(settings.ttl_secs),
            op_timeout,
            invalidate_timeout: op_timeout * 2,
            scan_batch: settings.scan_batch.max(1),
            invalidate_attempts: settings.invalidate_attempts.max(1),
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// Best-effort cache in front of the FAQ store.
///
/// Nothing here ever fails the caller: backend errors and timeouts are logged
/// and reads degrade to misses. The layer also tracks an invalidation
/// generation so fills that raced an invalidation can withdraw their entry.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    options: CacheOptions,
    generation: Arc<AtomicU64>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, options: CacheOptions) -> Self {
        Self {
            store,
            options,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create the layer and probe the backend. An unreachable backend is
    /// logged, not fatal: the service keeps serving from the store.
    pub async fn connect(store: Arc<dyn CacheStore>, options: CacheOptions) -> Self {
        let layer = Self::new(store, options);

        match timeout(layer.options.op_timeout, layer.store.ping()).await {
            Ok(Ok(())) => info!("Cache backend connected"),
            Ok(Err(e)) => warn!("Cache backend unavailable: {}. Reads fall back to the store.", e),
            Err(_) => warn!(
                "Cache backend did not answer within {:?}. Reads fall back to the store.",
                layer.options.op_timeout
            ),
        }

        layer
    }

    pub async fn close(&self) {
        match timeout(self.options.invalidate_timeout, self.store.close()).await {
            Ok(Ok(())) => info!("Cache backend closed"),
            Ok(Err(e)) => warn!("Failed to close cache backend: {}", e),
            Err(_) => warn!("Timed out closing cache backend"),
        }
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match timeout(self.options.op_timeout, self.store.get(key)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!("Cache get failed for '{}': {}", key, e);
                None
            }
            Err(_) => {
                warn!("Cache get timed out for '{}'", key);
                None
            }
        }
    }

    /// Returns whether the value was stored
    pub async fn set(&self, key: &str, value: String, ttl: TtlMs) -> bool {
        match timeout(self.options.op_timeout, self.store.set(key, value, ttl)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Cache set failed for '{}': {}", key, e);
                false
            }
            Err(_) => {
                warn!("Cache set timed out for '{}'", key);
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        match timeout(self.options.op_timeout, self.store.delete(key)).await {
            Ok(Ok(existed)) => existed,
            Ok(Err(e)) => {
                warn!("Cache delete failed for '{}': {}", key, e);
                false
            }
            Err(_) => {
                warn!("Cache delete timed out for '{}'", key);
                false
            }
        }
    }

    /// Store a value computed from data read after `observed_generation` was
    /// taken. If an invalidation happened in between, the entry is withdrawn
    /// so it cannot outlive the write that triggered the invalidation.
    ///
    /// Returns whether the entry is left in place.
    pub async fn fill(&self, key: &str, value: String, observed_generation: u64) -> bool {
        if self.generation() != observed_generation {
            debug!("Skipping fill of '{}': invalidated while computing", key);
            return false;
        }

        let stored = self.set(key, value, self.options.default_ttl).await;

        if !stored || self.generation() != observed_generation {
            // A timed out set may still land, so withdraw in both cases
            self.delete(key).await;
            debug!("Withdrew fill of '{}'", key);
            return false;
        }

        true
    }

    /// Remove every key matching `pattern`, retrying on failure. Returns
    /// whether the invalidation completed. Retries share one deadline so a
    /// stalled backend delays a write by at most `invalidate_timeout`.
    pub async fn invalidate(&self, pattern: &KeyPattern) -> bool {
        // Bump first: fills that observed the old generation must not survive
        self.generation.fetch_add(1, Ordering::SeqCst);

        let deadline = self.options.invalidate_timeout;
        match timeout(deadline, self.remove_with_retries(pattern)).await {
            Ok(true) => true,
            Ok(false) => {
                error!(
                    "Giving up on invalidating '{}' after {} attempt(s); cached listings may be stale until their TTL expires",
                    pattern, self.options.invalidate_attempts
                );
                false
            }
            Err(_) => {
                error!(
                    "Invalidating '{}' did not finish within {:?}; cached listings may be stale until their TTL expires",
                    pattern, deadline
                );
                false
            }
        }
    }

    async fn remove_with_retries(&self, pattern: &KeyPattern) -> bool {
        let attempts = self.options.invalidate_attempts;

        for attempt in 1..=attempts {
            match self
                .store
                .remove_matching(pattern, self.options.scan_batch)
                .await
            {
                Ok(removed) => {
                    debug!("Invalidated {} cache key(s) matching '{}'", removed, pattern);
                    return true;
                }
                Err(e) => warn!(
                    "Cache invalidation of '{}' failed (attempt {}/{}): {}",
                    pattern, attempt, attempts, e
                ),
            }

            if attempt < attempts {
                sleep(self.options.retry_backoff * attempt).await;
            }
        }

        false
    }
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("options", &self.options)
            .field("generation", &self.generation())
            .finish()
    }
}
