use lingua::{
    CacheLayer, CacheOptions, FaqService, GoogleTranslator, SledFaqRepository, TranslationGateway,
};
use shared::config::Config;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage_engine::MokaCacheStore;
use tracing::info;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub faq_service: Arc<FaqService>,
}

impl AppState {
    pub fn new(faq_service: Arc<FaqService>) -> Self {
        Self { faq_service }
    }

    /// Open the store, connect the cache and build the translation client
    pub async fn from_config(config: &Config) -> shared::Result<Self> {
        let store_path = Path::new(&config.data_dir).join("faqs.sled");
        info!("Opening FAQ store at {}", store_path.display());
        let repository = Arc::new(SledFaqRepository::new(&store_path)?);

        let cache_store = Arc::new(MokaCacheStore::new(
            "faq-listings",
            Some(config.cache.max_entries),
        ));
        let cache = CacheLayer::connect(cache_store, CacheOptions::from(&config.cache)).await;

        let request_timeout = Duration::from_millis(config.translation.timeout_ms);
        let translator = Arc::new(GoogleTranslator::new(
            config.translation.endpoint.clone(),
            request_timeout,
        )?);
        let translations = TranslationGateway::new(translator, request_timeout);

        Ok(Self::new(Arc::new(FaqService::new(
            repository,
            translations,
            cache,
        ))))
    }
}
