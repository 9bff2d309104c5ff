use regex::Regex;

/// Glob-style key pattern: `*` matches any run of characters, `?` exactly one
#[derive(Clone, Debug)]
pub struct KeyPattern {
    raw: String,
    regex: Regex,
}

impl KeyPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let regex = Regex::new(&glob_to_regex(&raw))
            .expect("glob literals are escaped, so the translated pattern is valid");
        Self { raw, regex }
    }

    /// The part of the pattern before the first wildcard. Every matching key
    /// starts with it, so backends can use it to skip keys cheaply.
    pub fn literal_prefix(&self) -> &str {
        match self.raw.find(['*', '?']) {
            Some(idx) => &self.raw[..idx],
            None => &self.raw,
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(self.literal_prefix()) && self.regex.is_match(key)
    }
}

/// Anchored regex equivalent of a glob
fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::from("(?s)^");
    let mut literal = String::new();

    for c in glob.chars() {
        match c {
            '*' | '?' => {
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                pattern.push_str(if c == '*' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }

    pattern.push_str(&regex::escape(&literal));
    pattern.push('$');
    pattern
}

impl std::fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
