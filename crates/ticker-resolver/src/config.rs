use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CACHE_PATH: &str = "data/stock_cache.json";
const DEFAULT_TTL_HOURS: u64 = 24;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RETRY_COOLDOWN_SECS: u64 = 300;
const DEFAULT_PAGE_SIZE: usize = 100;

/// Runtime settings for the listing cache and its providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Where the listing snapshot is persisted.
    pub cache_path: PathBuf,
    /// Age after which a snapshot is stale.
    pub staleness: Duration,
    /// Upper bound for one provider's full listing fetch.
    pub provider_timeout: Duration,
    /// Pause between lazy refresh attempts after a failed refresh.
    pub retry_cooldown: Duration,
    /// Rows requested per provider page.
    pub page_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            staleness: Duration::from_secs(DEFAULT_TTL_HOURS * 3600),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            retry_cooldown: Duration::from_secs(DEFAULT_RETRY_COOLDOWN_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ResolverConfig {
    /// Reads `.env` (if any) and the `TICKER_*` environment variables.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let cache_path = lookup("TICKER_CACHE_PATH")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_PATH.into());
        let ttl_hours = number("TICKER_CACHE_TTL_HOURS", DEFAULT_TTL_HOURS);
        let timeout_secs = number("TICKER_PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS);
        let cooldown_secs = number("TICKER_RETRY_COOLDOWN_SECS", DEFAULT_RETRY_COOLDOWN_SECS);
        let page_size = number("TICKER_PAGE_SIZE", DEFAULT_PAGE_SIZE as u64).max(1);

        Self {
            cache_path: PathBuf::from(cache_path),
            staleness: Duration::from_secs(ttl_hours.saturating_mul(3600)),
            provider_timeout: Duration::from_secs(timeout_secs),
            retry_cooldown: Duration::from_secs(cooldown_secs),
            page_size: usize::try_from(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_retry_cooldown(mut self, cooldown: Duration) -> Self {
        self.retry_cooldown = cooldown;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> ResolverConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResolverConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();

        assert_eq!(config.cache_path, PathBuf::from("data/stock_cache.json"));
        assert_eq!(config.staleness, Duration::from_secs(24 * 3600));
        assert_eq!(config.retry_cooldown, Duration::from_secs(300));
        assert_eq!(from_map(&[]), config);
    }

    #[test]
    fn test_values_from_environment() {
        let config = from_map(&[
            ("TICKER_CACHE_PATH", "/var/cache/tickers.json"),
            ("TICKER_CACHE_TTL_HOURS", "6"),
            ("TICKER_PROVIDER_TIMEOUT_SECS", "15"),
            ("TICKER_RETRY_COOLDOWN_SECS", "0"),
            ("TICKER_PAGE_SIZE", "500"),
        ]);

        assert_eq!(config.cache_path, PathBuf::from("/var/cache/tickers.json"));
        assert_eq!(config.staleness, Duration::from_secs(6 * 3600));
        assert_eq!(config.provider_timeout, Duration::from_secs(15));
        assert_eq!(config.retry_cooldown, Duration::ZERO);
        assert_eq!(config.page_size, 500);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = from_map(&[
            ("TICKER_CACHE_PATH", "  "),
            ("TICKER_CACHE_TTL_HOURS", "a day"),
            ("TICKER_PAGE_SIZE", "0"),
        ]);

        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(config.staleness, Duration::from_secs(24 * 3600));
        assert_eq!(config.page_size, 1);
    }
}
