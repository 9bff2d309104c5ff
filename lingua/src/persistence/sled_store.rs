use crate::domain::{FaqContent, FaqRecord};
use crate::ports::FaqRepository;
use async_trait::async_trait;
use shared::{Error, Result};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use sled::{Db, IVec, Transactional, Tree};
use std::fmt::Display;
use std::path::Path;

// Records are keyed by a monotonic sled id so iteration follows insertion order
const RECORDS_TREE: &str = "faq_records";
// FAQ id -> record key
const IDS_TREE: &str = "faq_ids";

/// Sled-backed FAQ store
#[derive(Clone)]
pub struct SledFaqRepository {
    db: Db,
    records: Tree,
    ids: Tree,
}

impl SledFaqRepository {
    /// Open (or create) the store at `path`, creating parent directories
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Store(format!("Failed to open Sled database: {}", e)))?;
        let records = db.open_tree(RECORDS_TREE).map_err(storage)?;
        let ids = db.open_tree(IDS_TREE).map_err(storage)?;

        Ok(Self { db, records, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| Error::Store(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<FaqRecord> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Store(format!("Failed to deserialize FAQ: {}", e)))
    }
}

fn storage(e: sled::Error) -> Error {
    Error::Store(e.to_string())
}

fn abort(e: impl Display) -> ConflictableTransactionError<String> {
    ConflictableTransactionError::Abort(e.to_string())
}

fn transaction_failed(e: TransactionError<String>) -> Error {
    match e {
        TransactionError::Abort(reason) => Error::Store(reason),
        TransactionError::Storage(e) => storage(e),
    }
}

#[async_trait]
impl FaqRepository for SledFaqRepository {
    async fn find_all(&self) -> Result<Vec<FaqRecord>> {
        let mut faqs = Vec::with_capacity(self.records.len());

        for item in self.records.iter() {
            let (_, value) = item.map_err(storage)?;
            faqs.push(Self::decode(&value)?);
        }

        Ok(faqs)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FaqRecord>> {
        let Some(position) = self.ids.get(id.as_bytes()).map_err(storage)? else {
            return Ok(None);
        };

        match self.records.get(&position).map_err(storage)? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            // Deleted between the two reads
            None => Ok(None),
        }
    }

    async fn insert(&self, content: FaqContent) -> Result<FaqRecord> {
        let record = FaqRecord::create(content);
        let position = self.db.generate_id().map_err(storage)?.to_be_bytes();
        let payload = serde_json::to_vec(&record)
            .map_err(|e| Error::Store(format!("Failed to serialize FAQ: {}", e)))?;

        let result: TransactionResult<(), String> =
            (&self.records, &self.ids).transaction(|(records, ids)| {
                records.insert(&position[..], payload.as_slice())?;
                ids.insert(record.id.as_bytes(), &position[..])?;
                Ok(())
            });
        result.map_err(transaction_failed)?;

        self.flush().await?;
        Ok(record)
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        content: FaqContent,
    ) -> Result<Option<FaqRecord>> {
        let result: TransactionResult<Option<FaqRecord>, String> =
            (&self.records, &self.ids).transaction(|(records, ids)| {
                let Some(position) = ids.get(id.as_bytes())? else {
                    return Ok(None);
                };
                let Some(existing) = records.get(&position)? else {
                    return Ok(None);
                };

                let existing: FaqRecord = serde_json::from_slice(&existing).map_err(abort)?;
                let updated = existing.with_content(content.clone());
                let payload = serde_json::to_vec(&updated).map_err(abort)?;

                records.insert(position, payload)?;
                Ok(Some(updated))
            });

        let updated = result.map_err(transaction_failed)?;
        if updated.is_some() {
            self.flush().await?;
        }
        Ok(updated)
    }

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<FaqRecord>> {
        let result: TransactionResult<Option<IVec>, String> =
            (&self.records, &self.ids).transaction(|(records, ids)| {
                let Some(position) = ids.remove(id.as_bytes())? else {
                    return Ok(None);
                };
                Ok(records.remove(position)?)
            });

        match result.map_err(transaction_failed)? {
            Some(value) => {
                self.flush().await?;
                Ok(Some(Self::decode(&value)?))
            }
            None => Ok(None),
        }
    }
}
