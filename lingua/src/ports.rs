use crate::cache::KeyPattern;
use crate::domain::{FaqContent, FaqRecord, Language};
use async_trait::async_trait;
use shared::{Result, TtlMs};

// Ports are the pluggable collaborators of the FAQ service

/// Durable FAQ storage. The repository owns record identity and is the
/// source of truth for every listing.
#[async_trait]
pub trait FaqRepository: Send + Sync + 'static {
    /// All records in insertion order
    async fn find_all(&self) -> Result<Vec<FaqRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<FaqRecord>>;

    /// Persist a new record, assigning its id
    async fn insert(&self, content: FaqContent) -> Result<FaqRecord>;

    /// Atomically replace a record's content. `None` if the id is unknown.
    async fn find_by_id_and_update(&self, id: &str, content: FaqContent)
    -> Result<Option<FaqRecord>>;

    /// Remove a record, returning it. `None` if the id is unknown.
    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<FaqRecord>>;
}

/// Key-value backend behind the cache layer
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: TtlMs) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every key matching `pattern`, scanning and deleting at most
    /// `batch_size` keys at a time. Returns the number of keys removed.
    async fn remove_matching(&self, pattern: &KeyPattern, batch_size: usize) -> Result<u64>;

    async fn ping(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Machine translation provider
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    async fn translate(&self, text: &str, target: Language) -> Result<String>;
}
