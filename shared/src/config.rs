use std::str::FromStr;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub allowed_origins: Vec<String>,
    pub cache: CacheSettings,
    pub translation: TranslationSettings,
}

#[derive(Clone, Debug)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_entries: u64,
    pub op_timeout_ms: u64,
    pub scan_batch: usize,
    pub invalidate_attempts: u32,
}

#[derive(Clone, Debug)]
pub struct TranslationSettings {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: Config::DEFAULT_CACHE_TTL_SECS,
            max_entries: 10_000,
            op_timeout_ms: 250,
            scan_batch: 100,
            invalidate_attempts: 3,
        }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: Config::DEFAULT_TRANSLATE_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8000;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
    const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for missing
    /// or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_defaults = CacheSettings::default();
        let translation_defaults = TranslationSettings::default();

        Self {
            host: lookup("LINGUA_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or(&lookup, "LINGUA_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            data_dir: lookup("LINGUA_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            allowed_origins: lookup("LINGUA_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cache: CacheSettings {
                ttl_secs: parse_or(&lookup, "LINGUA_CACHE_TTL_SECS", cache_defaults.ttl_secs),
                max_entries: parse_or(
                    &lookup,
                    "LINGUA_CACHE_MAX_ENTRIES",
                    cache_defaults.max_entries,
                ),
                op_timeout_ms: parse_or(
                    &lookup,
                    "LINGUA_CACHE_OP_TIMEOUT_MS",
                    cache_defaults.op_timeout_ms,
                ),
                scan_batch: parse_or(&lookup, "LINGUA_CACHE_SCAN_BATCH", cache_defaults.scan_batch)
                    .max(1),
                invalidate_attempts: parse_or(
                    &lookup,
                    "LINGUA_CACHE_INVALIDATE_ATTEMPTS",
                    cache_defaults.invalidate_attempts,
                )
                .max(1),
            },
            translation: TranslationSettings {
                endpoint: lookup("LINGUA_TRANSLATE_URL").unwrap_or(translation_defaults.endpoint),
                timeout_ms: parse_or(
                    &lookup,
                    "LINGUA_TRANSLATE_TIMEOUT_MS",
                    translation_defaults.timeout_ms,
                ),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
