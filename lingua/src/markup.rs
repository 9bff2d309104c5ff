//! Plain-text extraction for rich-text answers. Used for emptiness checks only;
//! stored answers keep their markup.

use regex::Regex;
use std::sync::LazyLock;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("markup pattern is valid"));

const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Strip tags and comments, decode common entities and collapse whitespace
pub fn strip_markup(html: &str) -> String {
    let mut text = MARKUP.replace_all(html, " ").into_owned();

    // &amp; is last so "&amp;lt;" decodes to "&lt;" and not "<"
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_blank(html: &str) -> bool {
    strip_markup(html).is_empty()
}
