//! In-memory fakes for the ports, shared by unit tests across the crate

use crate::cache::KeyPattern;
use crate::domain::{FaqContent, FaqRecord, Language};
use crate::persistence::SledFaqRepository;
use crate::ports::{CacheStore, FaqRepository, Translator};
use async_trait::async_trait;
use shared::{Error, Result, TtlMs};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    failing_removals: AtomicU32,
    sets: AtomicUsize,
}

impl MemoryCacheStore {
    /// Make the next `n` calls to `remove_matching` fail
    pub fn fail_next_removals(&self, n: u32) {
        self.failing_removals.store(n, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: TtlMs) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let expires_at = Instant::now() + ttl.as_duration();
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn remove_matching(&self, pattern: &KeyPattern, batch_size: usize) -> Result<u64> {
        let failing = self.failing_removals.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_removals.store(failing - 1, Ordering::SeqCst);
            return Err(Error::Cache("connection reset".into()));
        }

        let mut removed = 0;
        loop {
            let batch: Vec<String> = {
                let entries = self.entries.lock().unwrap();
                entries
                    .keys()
                    .filter(|k| pattern.matches(k))
                    .take(batch_size)
                    .cloned()
                    .collect()
            };
            if batch.is_empty() {
                break;
            }
            let mut entries = self.entries.lock().unwrap();
            for key in batch {
                if entries.remove(&key).is_some() {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// Cache backend that refuses every call
pub struct UnreachableCacheStore;

#[async_trait]
impl CacheStore for UnreachableCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: TtlMs) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn remove_matching(&self, _pattern: &KeyPattern, _batch_size: usize) -> Result<u64> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn ping(&self) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Cache backend that never answers
pub struct HangingCacheStore;

#[async_trait]
impl CacheStore for HangingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: String, _ttl: TtlMs) -> Result<()> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        std::future::pending().await
    }

    async fn remove_matching(&self, _pattern: &KeyPattern, _batch_size: usize) -> Result<u64> {
        std::future::pending().await
    }

    async fn ping(&self) -> Result<()> {
        std::future::pending().await
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Deterministic translator: `[hi] text`. Languages can be made to fail or hang.
#[derive(Default)]
pub struct ScriptedTranslator {
    failing: Mutex<HashSet<Language>>,
    hanging: Mutex<HashSet<Language>>,
    calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn fail(&self, lang: Language) {
        self.failing.lock().unwrap().insert(lang);
    }

    pub fn hang(&self, lang: Language) {
        self.hanging.lock().unwrap().insert(lang);
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
        self.hanging.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn render(text: &str, target: Language) -> String {
        format!("[{}] {}", target, text)
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let hangs = self.hanging.lock().unwrap().contains(&target);
        if hangs {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if self.failing.lock().unwrap().contains(&target) {
            return Err(Error::translation(target.code(), "provider unavailable"));
        }

        Ok(Self::render(text, target))
    }
}

/// Repository whose writes always fail
pub struct BrokenRepository;

#[async_trait]
impl FaqRepository for BrokenRepository {
    async fn find_all(&self) -> Result<Vec<FaqRecord>> {
        Err(Error::Store("database offline".into()))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<FaqRecord>> {
        Err(Error::Store("database offline".into()))
    }

    async fn insert(&self, _content: FaqContent) -> Result<FaqRecord> {
        Err(Error::Store("database offline".into()))
    }

    async fn find_by_id_and_update(
        &self,
        _id: &str,
        _content: FaqContent,
    ) -> Result<Option<FaqRecord>> {
        Err(Error::Store("database offline".into()))
    }

    async fn find_by_id_and_delete(&self, _id: &str) -> Result<Option<FaqRecord>> {
        Err(Error::Store("database offline".into()))
    }
}

pub fn temp_repository() -> (TempDir, SledFaqRepository) {
    let dir = tempfile::tempdir().unwrap();
    let repository = SledFaqRepository::new(dir.path().join("faqs.sled")).unwrap();
    (dir, repository)
}
