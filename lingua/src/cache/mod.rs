mod layer;
mod pattern;

pub use layer::{CacheLayer, CacheOptions};
pub use pattern::KeyPattern;

use crate::domain::Language;

/// Prefix shared by every cached FAQ listing
pub const LISTING_PREFIX: &str = "faqs:";

/// Pattern matching every cached FAQ listing
pub const LISTING_PATTERN: &str = "faqs:*";

/// Cache key holding the listing projected into `lang`
pub fn listing_key(lang: Language) -> String {
    format!("{}{}", LISTING_PREFIX, lang.code())
}

pub fn listing_pattern() -> KeyPattern {
    KeyPattern::new(LISTING_PATTERN)
}
