#![deny(clippy::all)]

pub mod cache;
pub mod domain;
pub mod markup;
pub mod persistence;
pub mod ports;
pub mod service;
pub mod translation;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheLayer, CacheOptions, KeyPattern};
pub use domain::{FaqContent, FaqProjection, FaqRecord, Language, Translation};
pub use persistence::SledFaqRepository;
pub use ports::{CacheStore, FaqRepository, Translator};
pub use service::FaqService;
pub use translation::{GoogleTranslator, TranslationGateway};
