use chrono::{DateTime, Utc};
use lingua::{FaqRecord, Language, Translation};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub translations: BTreeMap<Language, Translation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FaqRecord> for FaqResponse {
    fn from(faq: FaqRecord) -> Self {
        Self {
            id: faq.id,
            question: faq.question,
            answer: faq.answer,
            translations: faq.translations,
            created_at: faq.created_at,
            updated_at: faq.updated_at,
        }
    }
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }
}
