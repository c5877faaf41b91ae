//! Process configuration read once from `CURATOR_*` environment variables.

use std::env;
use std::time::Duration;

use storage::repository::validate_bucket;
use url::Url;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_DB_URL: &str = "sqlite://curator.sqlite3";
pub const DEFAULT_BUCKET: &str = "quiz-batches";
pub const DEFAULT_EMBED_BASE_URL: &str = "https://quizizz.com/embed/quiz";

/// Credentials and endpoint of the external quiz service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizApiConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CuratorConfig {
    pub db_url: String,
    pub bucket: String,
    /// `None` when either the base url or the key is missing.
    pub quiz_api: Option<QuizApiConfig>,
    pub embed_base_url: String,
    pub retry: RetryPolicy,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            quiz_api: None,
            embed_base_url: DEFAULT_EMBED_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CuratorConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bucket = get("CURATOR_BUCKET").unwrap_or(defaults.bucket);
        validate_bucket(&bucket)?;

        let quiz_api = match (get("CURATOR_QUIZ_API_BASE_URL"), get("CURATOR_QUIZ_API_KEY")) {
            (Some(base_url), Some(api_key)) => Some(QuizApiConfig {
                base_url: checked_url("CURATOR_QUIZ_API_BASE_URL", base_url)?,
                api_key,
            }),
            _ => None,
        };

        let embed_base_url = match get("CURATOR_EMBED_BASE_URL") {
            Some(url) => checked_url("CURATOR_EMBED_BASE_URL", url)?,
            None => defaults.embed_base_url,
        };

        let mut retry = defaults.retry;
        if let Some(raw) = get("CURATOR_RETRY_MAX") {
            retry.max_retries = parse_number("CURATOR_RETRY_MAX", &raw)?;
        }
        if let Some(raw) = get("CURATOR_RETRY_DELAY_MS") {
            retry.base_delay =
                Duration::from_millis(parse_number("CURATOR_RETRY_DELAY_MS", &raw)?);
        }

        Ok(Self {
            db_url: get("CURATOR_DB_URL").unwrap_or(defaults.db_url),
            bucket,
            quiz_api,
            embed_base_url,
            retry,
        })
    }
}

fn checked_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(value.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::InvalidUrl { var, value }),
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<CuratorConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CuratorConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, CuratorConfig::default());
        assert_eq!(cfg.retry.max_retries, 2);
        assert!(cfg.quiz_api.is_none());
    }

    #[test]
    fn quiz_api_needs_both_url_and_key() {
        let cfg = config(&[("CURATOR_QUIZ_API_BASE_URL", "https://api.example.com/v1/")]).unwrap();
        assert!(cfg.quiz_api.is_none());

        let cfg = config(&[
            ("CURATOR_QUIZ_API_BASE_URL", "https://api.example.com/v1/"),
            ("CURATOR_QUIZ_API_KEY", "secret"),
        ])
        .unwrap();
        let api = cfg.quiz_api.unwrap();
        assert_eq!(api.base_url, "https://api.example.com/v1");
        assert_eq!(api.api_key, "secret");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("CURATOR_RETRY_MAX", "two")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[("CURATOR_EMBED_BASE_URL", "ftp://example.com")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            config(&[("CURATOR_BUCKET", "Bad Bucket")]),
            Err(ConfigError::Bucket(_))
        ));
    }

    #[test]
    fn retry_overrides() {
        let cfg = config(&[("CURATOR_RETRY_MAX", "0"), ("CURATOR_RETRY_DELAY_MS", "250")]).unwrap();
        assert_eq!(cfg.retry.max_retries, 0);
        assert_eq!(cfg.retry.base_delay, Duration::from_millis(250));
    }
}
