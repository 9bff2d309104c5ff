use crate::domain::Language;
use crate::ports::Translator;
use async_trait::async_trait;
use serde_json::Value;
use shared::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Translator backed by the public Google Translate web endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("lingua-faq/0.1")
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The text travels in a form body: rich-text answers can outgrow URL
    /// length limits.
    fn request(&self, text: &str, target: Language) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", Language::SOURCE.code()),
                ("tl", target.code()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let failed = |reason: String| Error::translation(target.code(), reason);

        let response = self
            .request(text, target)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("provider responded with {}", status)));
        }

        let body: Value = response.json().await.map_err(|e| failed(e.to_string()))?;

        let translated = join_segments(&body)
            .ok_or_else(|| failed("unexpected response shape".to_string()))?;

        debug!(
            "Translated {} chars into '{}' ({} chars)",
            text.len(),
            target,
            translated.len()
        );
        Ok(translated)
    }
}

/// The endpoint answers with `[[["<translated>", "<source>", ...], ...], ...]`,
/// one inner array per sentence.
fn join_segments(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}
