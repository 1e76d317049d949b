// src/config.rs
//
// Runtime configuration
//
// PRINCIPLES:
// - Every tunable has a Default matching the upstream service etiquette
// - Environment overrides are explicit (MANAPRINT_* variables)
// - Directories live under the platform data dir: {APP_DATA}/manaprint/...

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Upper bound accepted for `MANAPRINT_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 16;

/// Request budget and retry policy for the card-data API.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitPolicy {
    /// Every `request_limit`-th request is followed by a mandatory pause.
    pub request_limit: u64,
    /// Length of the mandatory pause; also the base of the 429 backoff.
    pub pause: Duration,
    /// Fixed delay after every request.
    pub delay_between: Duration,
    /// Total attempts made while the upstream keeps answering 429.
    pub max_retries: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            request_limit: 200,
            pause: Duration::from_secs(60),
            delay_between: Duration::from_millis(100),
            max_retries: 3,
        }
    }
}

/// Settings for the text-advice service.
#[derive(Debug, Clone)]
pub struct AdviceConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub card_api_base_url: String,
    pub exchange_rate_url: String,
    pub default_usd_to_eur: f64,
    /// Language used for the localized rules text on card pages.
    pub localized_language: String,
    pub rate_limit: RateLimitPolicy,
    pub advice: AdviceConfig,
    pub image_cache_dir: PathBuf,
    pub documents_dir: PathBuf,
    pub mana_symbols_dir: PathBuf,
    /// External vocabulary file; the bundled vocabulary is used when absent.
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let base = default_data_dir();
        Self {
            card_api_base_url: "https://api.scryfall.com".to_string(),
            exchange_rate_url: "https://api.exchangerate.host/latest?base=USD&symbols=EUR"
                .to_string(),
            default_usd_to_eur: 0.92,
            localized_language: "it".to_string(),
            rate_limit: RateLimitPolicy::default(),
            advice: AdviceConfig::default(),
            image_cache_dir: base.join("card_images"),
            documents_dir: base.join("lists"),
            mana_symbols_dir: base.join("mana_symbols"),
            vocabulary_path: None,
        }
    }
}

/// Application data directory.
///
/// Falls back to the working directory when the platform has no data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("manaprint")
}

impl AppConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MANAPRINT_API_BASE_URL") {
            config.card_api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("MANAPRINT_EXCHANGE_RATE_URL") {
            config.exchange_rate_url = url;
        }
        if let Some(rate) = lookup("MANAPRINT_DEFAULT_USD_TO_EUR") {
            config.default_usd_to_eur = parse_number("MANAPRINT_DEFAULT_USD_TO_EUR", &rate)?;
        }
        if let Some(lang) = lookup("MANAPRINT_LANGUAGE") {
            config.localized_language = lang;
        }
        if let Some(limit) = lookup("MANAPRINT_REQUEST_LIMIT") {
            config.rate_limit.request_limit = parse_number("MANAPRINT_REQUEST_LIMIT", &limit)?;
        }
        if let Some(secs) = lookup("MANAPRINT_PAUSE_SECS") {
            config.rate_limit.pause = parse_seconds("MANAPRINT_PAUSE_SECS", &secs)?;
        }
        if let Some(secs) = lookup("MANAPRINT_DELAY_SECS") {
            config.rate_limit.delay_between = parse_seconds("MANAPRINT_DELAY_SECS", &secs)?;
        }
        if let Some(retries) = lookup("MANAPRINT_MAX_RETRIES") {
            let retries: u32 = parse_number("MANAPRINT_MAX_RETRIES", &retries)?;
            if retries > MAX_RETRIES_LIMIT {
                return Err(AppError::Config(format!(
                    "MANAPRINT_MAX_RETRIES must be at most {}, got {}",
                    MAX_RETRIES_LIMIT, retries
                )));
            }
            config.rate_limit.max_retries = retries;
        }
        if let Some(endpoint) = lookup("MANAPRINT_ADVICE_ENDPOINT") {
            config.advice.endpoint = endpoint;
        }
        if let Some(model) = lookup("MANAPRINT_ADVICE_MODEL") {
            config.advice.model = model;
        }
        config.advice.api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());

        if let Some(dir) = lookup("MANAPRINT_DATA_DIR") {
            let base = PathBuf::from(dir);
            config.image_cache_dir = base.join("card_images");
            config.documents_dir = base.join("lists");
            config.mana_symbols_dir = base.join("mana_symbols");
        }
        if let Some(dir) = lookup("MANAPRINT_MANA_SYMBOLS_DIR") {
            config.mana_symbols_dir = PathBuf::from(dir);
        }
        config.vocabulary_path = lookup("MANAPRINT_VOCABULARY").map(PathBuf::from);

        Ok(config)
    }
}

/// Non-negative, finite seconds.
fn parse_seconds(key: &str, raw: &str) -> AppResult<Duration> {
    let secs: f64 = parse_number(key, raw)?;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        AppError::Config(format!(
            "{} must be a non-negative number of seconds, got '{}'",
            key, raw
        ))
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_upstream_etiquette() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit.request_limit, 200);
        assert_eq!(config.rate_limit.pause, Duration::from_secs(60));
        assert_eq!(config.rate_limit.delay_between, Duration::from_millis(100));
        assert_eq!(config.rate_limit.max_retries, 3);
        assert!((config.default_usd_to_eur - 0.92).abs() < f64::EPSILON);
        assert!(config.documents_dir.ends_with("manaprint/lists"));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MANAPRINT_API_BASE_URL", "http://localhost:9000/"),
            ("MANAPRINT_REQUEST_LIMIT", "10"),
            ("MANAPRINT_PAUSE_SECS", "0.5"),
            ("MANAPRINT_DATA_DIR", "/tmp/mp"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.card_api_base_url, "http://localhost:9000");
        assert_eq!(config.rate_limit.request_limit, 10);
        assert_eq!(config.rate_limit.pause, Duration::from_millis(500));
        assert_eq!(config.documents_dir, PathBuf::from("/tmp/mp/lists"));
        assert_eq!(config.advice.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_out_of_range_seconds_are_config_errors() {
        for raw in ["-1", "NaN", "inf"] {
            let result = AppConfig::from_lookup(lookup_from(&[("MANAPRINT_PAUSE_SECS", raw)]));
            assert!(matches!(result, Err(AppError::Config(_))), "pause {}", raw);

            let result = AppConfig::from_lookup(lookup_from(&[("MANAPRINT_DELAY_SECS", raw)]));
            assert!(matches!(result, Err(AppError::Config(_))), "delay {}", raw);
        }
    }

    #[test]
    fn test_retry_count_is_bounded() {
        let result = AppConfig::from_lookup(lookup_from(&[("MANAPRINT_MAX_RETRIES", "33")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let config =
            AppConfig::from_lookup(lookup_from(&[("MANAPRINT_MAX_RETRIES", "16")])).unwrap();
        assert_eq!(config.rate_limit.max_retries, 16);
    }

    #[test]
    fn test_malformed_number_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("MANAPRINT_MAX_RETRIES", "many")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
