use std::time::Duration;

use crate::error::SupplySignalError;

const DEFAULT_CLASSIFIER_MODEL: &str = "claude-haiku-4-5-20251001";
const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";

/// One week.
pub const MAX_INGEST_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Application configuration loaded from environment variables.
///
/// Every credential is optional: a missing key switches the matching
/// component to its simulated variant instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    // AI classification
    pub anthropic_api_key: Option<String>,
    pub classifier_model: String,

    // Signal sources
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub weather_api_key: Option<String>,
    pub weather_api_url: String,

    // Persistence
    pub database_url: Option<String>,

    // Ingestion
    pub ingest_interval_minutes: u64,
    pub ingest_concurrency: usize,

    // Upstream HTTP
    pub http_timeout_secs: u64,
    pub http_max_attempts: u32,
    pub http_retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            news_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            weather_api_key: None,
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            database_url: None,
            ingest_interval_minutes: 15,
            ingest_concurrency: 8,
            http_timeout_secs: 10,
            http_max_attempts: 3,
            http_retry_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, SupplySignalError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_redacted();
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SupplySignalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            classifier_model: get("CLASSIFIER_MODEL").unwrap_or(defaults.classifier_model),
            news_api_key: get("NEWS_API_KEY"),
            news_api_url: get("NEWS_API_URL").unwrap_or(defaults.news_api_url),
            weather_api_key: get("WEATHER_API_KEY"),
            weather_api_url: get("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            database_url: get("DATABASE_URL"),
            ingest_interval_minutes: parse_or(
                "INGEST_INTERVAL_MINUTES",
                get("INGEST_INTERVAL_MINUTES"),
                defaults.ingest_interval_minutes,
            )?,
            ingest_concurrency: parse_or(
                "INGEST_CONCURRENCY",
                get("INGEST_CONCURRENCY"),
                defaults.ingest_concurrency,
            )?,
            http_timeout_secs: parse_or(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                defaults.http_timeout_secs,
            )?,
            http_max_attempts: parse_or(
                "HTTP_MAX_ATTEMPTS",
                get("HTTP_MAX_ATTEMPTS"),
                defaults.http_max_attempts,
            )?,
            http_retry_delay_ms: parse_or(
                "HTTP_RETRY_DELAY_MS",
                get("HTTP_RETRY_DELAY_MS"),
                defaults.http_retry_delay_ms,
            )?,
        };

        if config.ingest_interval_minutes == 0 {
            return Err(SupplySignalError::Config(
                "INGEST_INTERVAL_MINUTES must be at least 1".into(),
            ));
        }
        if config.ingest_interval_minutes > MAX_INGEST_INTERVAL_MINUTES {
            return Err(SupplySignalError::Config(format!(
                "INGEST_INTERVAL_MINUTES must be at most {MAX_INGEST_INTERVAL_MINUTES}"
            )));
        }
        if config.http_max_attempts == 0 {
            return Err(SupplySignalError::Config(
                "HTTP_MAX_ATTEMPTS must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    pub fn ingest_interval(&self) -> Duration {
        Duration::from_secs(self.ingest_interval_minutes.saturating_mul(60))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn http_retry_delay(&self) -> Duration {
        Duration::from_millis(self.http_retry_delay_ms)
    }

    pub fn log_redacted(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.char_indices().nth(5).map(|(i, _)| i).unwrap_or(v.len());
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  ANTHROPIC_API_KEY: {}", preview_opt(&self.anthropic_api_key));
        tracing::info!("  CLASSIFIER_MODEL: {}", self.classifier_model);
        tracing::info!("  NEWS_API_KEY: {}", preview_opt(&self.news_api_key));
        tracing::info!("  WEATHER_API_KEY: {}", preview_opt(&self.weather_api_key));
        tracing::info!(
            "  DATABASE_URL: {}",
            if self.database_url.is_some() { "<set>" } else { "<not set>" }
        );
        tracing::info!(
            interval_minutes = self.ingest_interval_minutes,
            concurrency = self.ingest_concurrency,
            http_attempts = self.http_max_attempts,
            "  Ingestion settings"
        );
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, SupplySignalError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| SupplySignalError::Config(format!("{key} must be a number, got '{v}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.ingest_interval_minutes, 15);
        assert_eq!(config.http_max_attempts, 3);
        assert_eq!(config.ingest_interval(), Duration::from_secs(900));
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "   ")])).unwrap();
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn numeric_overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("INGEST_INTERVAL_MINUTES", "5"),
            ("HTTP_RETRY_DELAY_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.ingest_interval_minutes, 5);
        assert_eq!(config.http_retry_delay(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_number_is_config_error() {
        let err = Config::from_lookup(lookup(&[("HTTP_MAX_ATTEMPTS", "three")])).unwrap_err();
        assert!(matches!(err, SupplySignalError::Config(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::from_lookup(lookup(&[("INGEST_INTERVAL_MINUTES", "0")])).unwrap_err();
        assert!(err.to_string().contains("INGEST_INTERVAL_MINUTES"));
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let week = MAX_INGEST_INTERVAL_MINUTES.to_string();
        let config = Config::from_lookup(lookup(&[("INGEST_INTERVAL_MINUTES", week.as_str())])).unwrap();
        assert_eq!(config.ingest_interval(), Duration::from_secs(7 * 24 * 3600));

        let huge = u64::MAX.to_string();
        let err = Config::from_lookup(lookup(&[("INGEST_INTERVAL_MINUTES", huge.as_str())])).unwrap_err();
        assert!(matches!(err, SupplySignalError::Config(msg) if msg.contains("at most")));

        let direct = Config {
            ingest_interval_minutes: u64::MAX,
            ..Config::default()
        };
        assert_eq!(direct.ingest_interval(), Duration::from_secs(u64::MAX));
    }
}
