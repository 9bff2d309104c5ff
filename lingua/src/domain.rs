use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Languages the FAQ listing can be served in. English is authored directly,
/// the rest are machine translated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Bn,
}

impl Language {
    pub const SOURCE: Language = Language::En;

    const TARGETS: [Language; 2] = [Language::Hi, Language::Bn];

    /// Languages every record must carry a translation for
    pub fn targets() -> &'static [Language] {
        &Self::TARGETS
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "bn" => Some(Language::Bn),
            _ => None,
        }
    }

    /// Resolve a requested language, defaulting to the source language when the
    /// code is absent or unsupported
    pub fn normalize(code: Option<&str>) -> Self {
        code.and_then(Self::from_code).unwrap_or(Self::SOURCE)
    }

    pub fn is_source(&self) -> bool {
        *self == Self::SOURCE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub question: String,
    pub answer: String,
}

/// The mutable part of a record: what create and update write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaqContent {
    pub question: String,
    pub answer: String,
    pub translations: BTreeMap<Language, Translation>,
}

impl FaqContent {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        translations: BTreeMap<Language, Translation>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            translations,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub translations: BTreeMap<Language, Translation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FaqRecord {
    /// Build a new record with a fresh identity
    pub fn create(content: FaqContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            question: content.question,
            answer: content.answer,
            translations: content.translations,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace question, answer and every translation at once. Identity and
    /// creation time are kept.
    pub fn with_content(self, content: FaqContent) -> Self {
        Self {
            question: content.question,
            answer: content.answer,
            translations: content.translations,
            updated_at: Utc::now(),
            ..self
        }
    }

    pub fn is_fully_translated(&self) -> bool {
        Language::targets()
            .iter()
            .all(|lang| self.translations.contains_key(lang))
    }

    /// Render the record in `lang`. Returns `None` when the record has no stored
    /// translation for that language.
    pub fn project(&self, lang: Language) -> Option<FaqProjection> {
        if lang.is_source() {
            return Some(self.source_projection());
        }

        self.translations.get(&lang).map(|t| FaqProjection {
            id: self.id.clone(),
            question: t.question.clone(),
            answer: t.answer.clone(),
        })
    }

    pub fn source_projection(&self) -> FaqProjection {
        FaqProjection {
            id: self.id.clone(),
            question: self.question.clone(),
            answer: self.answer.clone(),
        }
    }
}

/// A record rendered into a single language for listings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqProjection {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl FaqProjection {
    pub fn from_translation(id: impl Into<String>, translation: Translation) -> Self {
        Self {
            id: id.into(),
            question: translation.question,
            answer: translation.answer,
        }
    }
}
