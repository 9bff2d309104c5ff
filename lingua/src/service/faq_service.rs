use crate::cache::{CacheLayer, listing_key, listing_pattern};
use crate::domain::{FaqContent, FaqProjection, FaqRecord, Language};
use crate::markup;
use crate::ports::FaqRepository;
use crate::translation::TranslationGateway;
use futures::future::join_all;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates FAQ reads and writes across the store, the translation
/// gateway and the listing cache.
///
/// Writes always commit to the store before the cached listings are
/// invalidated. Invalidating first would let a concurrent read repopulate the
/// cache with pre-write data that nothing would ever refresh.
#[derive(Clone)]
pub struct FaqService {
    repository: Arc<dyn FaqRepository>,
    translations: TranslationGateway,
    cache: CacheLayer,
}

impl FaqService {
    pub fn new(
        repository: Arc<dyn FaqRepository>,
        translations: TranslationGateway,
        cache: CacheLayer,
    ) -> Self {
        Self {
            repository,
            translations,
            cache,
        }
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    /// List every FAQ projected into `lang` (defaults to English), serving
    /// from the cache when possible
    pub async fn list_faqs(&self, lang: Option<&str>) -> Result<Vec<FaqProjection>> {
        let lang = Language::normalize(lang);
        let key = listing_key(lang);

        if let Some(payload) = self.cache.get(&key).await {
            match serde_json::from_str::<Vec<FaqProjection>>(&payload) {
                Ok(listing) => {
                    debug!("Cache hit for '{}'", key);
                    return Ok(listing);
                }
                Err(e) => warn!("Discarding unreadable cache entry '{}': {}", key, e),
            }
        }

        // Taken before reading the store so a racing invalidation is detected
        let generation = self.cache.generation();
        let records = self.repository.find_all().await?;
        let (listing, complete) = self.project_all(&records, lang).await;

        if complete {
            match serde_json::to_string(&listing) {
                Ok(payload) => {
                    self.cache.fill(&key, payload, generation).await;
                }
                Err(e) => warn!("Failed to serialize listing for '{}': {}", key, e),
            }
        } else {
            warn!(
                "Listing for '{}' has untranslated entries, not caching it",
                lang
            );
        }

        Ok(listing)
    }

    pub async fn get_faq(&self, id: &str) -> Result<FaqRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("FAQ '{}'", id)))
    }

    pub async fn create_faq(&self, question: &str, answer: &str) -> Result<FaqRecord> {
        let question = validate(question, answer)?;

        // Nothing is persisted unless every language translated
        let translations = self.translations.translate_all(question, answer).await?;

        let faq = self
            .repository
            .insert(FaqContent::new(question, answer, translations))
            .await?;
        info!("Created FAQ {}", faq.id);

        self.invalidate_listings().await;
        Ok(faq)
    }

    pub async fn update_faq(&self, id: &str, question: &str, answer: &str) -> Result<FaqRecord> {
        let question = validate(question, answer)?;

        // Spare the translation calls for ids that do not exist
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(Error::NotFound(format!("FAQ '{}'", id)));
        }

        let translations = self.translations.translate_all(question, answer).await?;

        let faq = self
            .repository
            .find_by_id_and_update(id, FaqContent::new(question, answer, translations))
            .await?
            .ok_or_else(|| Error::NotFound(format!("FAQ '{}'", id)))?;
        info!("Updated FAQ {}", faq.id);

        self.invalidate_listings().await;
        Ok(faq)
    }

    pub async fn delete_faq(&self, id: &str) -> Result<FaqRecord> {
        let faq = self
            .repository
            .find_by_id_and_delete(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("FAQ '{}'", id)))?;
        info!("Deleted FAQ {}", faq.id);

        self.invalidate_listings().await;
        Ok(faq)
    }

    async fn invalidate_listings(&self) {
        self.cache.invalidate(&listing_pattern()).await;
    }

    /// Project every record, preserving store order. The flag is false when
    /// at least one record fell back to its source text.
    async fn project_all(&self, records: &[FaqRecord], lang: Language) -> (Vec<FaqProjection>, bool) {
        let projections = join_all(records.iter().map(|faq| self.project(faq, lang))).await;

        let complete = projections.iter().all(|(_, translated)| *translated);
        let listing = projections.into_iter().map(|(p, _)| p).collect();
        (listing, complete)
    }

    async fn project(&self, faq: &FaqRecord, lang: Language) -> (FaqProjection, bool) {
        if let Some(projection) = faq.project(lang) {
            return (projection, true);
        }

        // Records written before `lang` was supported
        match self
            .translations
            .translate_pair(&faq.question, &faq.answer, lang)
            .await
        {
            Ok(translation) => (FaqProjection::from_translation(&faq.id, translation), true),
            Err(e) => {
                warn!("Serving FAQ {} untranslated: {}", faq.id, e);
                (faq.source_projection(), false)
            }
        }
    }
}

/// Check both fields are present. The answer is checked as plain text but
/// stored with its markup. Returns the trimmed question.
fn validate<'a>(question: &'a str, answer: &str) -> Result<&'a str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::Validation("question is required".into()));
    }
    if markup::is_blank(answer) {
        return Err(Error::Validation("answer is required".into()));
    }
    Ok(question)
}

impl std::fmt::Debug for FaqService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaqService")
            .field("translations", &self.translations)
            .field("cache", &self.cache)
            .finish()
    }
}
