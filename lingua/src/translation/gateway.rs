use crate::domain::{Language, Translation};
use crate::ports::Translator;
use futures::future::{try_join, try_join_all};
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Bounded access to the translation provider.
///
/// Every call is capped by `timeout`; a hung provider surfaces as a
/// translation error instead of stalling the request.
#[derive(Clone)]
pub struct TranslationGateway {
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl TranslationGateway {
    pub fn new(translator: Arc<dyn Translator>, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    pub async fn translate(&self, text: &str, target: Language) -> Result<String> {
        if target.is_source() || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let translated = match timeout(self.timeout, self.translator.translate(text, target)).await
        {
            Ok(Ok(translated)) => translated,
            Ok(Err(e @ Error::Translation { .. })) => return Err(e),
            Ok(Err(e)) => return Err(Error::translation(target.code(), e.to_string())),
            Err(_) => {
                warn!("Translation to '{}' timed out after {:?}", target, self.timeout);
                return Err(Error::translation(
                    target.code(),
                    format!("timed out after {}ms", self.timeout.as_millis()),
                ));
            }
        };

        if translated.trim().is_empty() {
            return Err(Error::translation(target.code(), "provider returned empty text"));
        }

        Ok(translated)
    }

    /// Translate a question/answer pair into one language
    pub async fn translate_pair(
        &self,
        question: &str,
        answer: &str,
        target: Language,
    ) -> Result<Translation> {
        let (question, answer) = try_join(
            self.translate(question, target),
            self.translate(answer, target),
        )
        .await?;

        Ok(Translation { question, answer })
    }

    /// Translate into every target language concurrently. The first failure
    /// aborts the remaining calls.
    pub async fn translate_all(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<BTreeMap<Language, Translation>> {
        let jobs = Language::targets().iter().map(|&lang| async move {
            let translation = self.translate_pair(question, answer, lang).await?;
            Ok::<_, Error>((lang, translation))
        });

        let translations: BTreeMap<Language, Translation> =
            try_join_all(jobs).await?.into_iter().collect();

        debug!("Translated FAQ into {} language(s)", translations.len());
        Ok(translations)
    }
}

impl std::fmt::Debug for TranslationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationGateway")
            .field("timeout", &self.timeout)
            .finish()
    }
}
