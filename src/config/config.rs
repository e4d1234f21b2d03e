use std::time::Duration;

use anyhow::anyhow;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::cron::CronSettings;
use crate::utils::RetryPolicy;

/// PostgreSQL database connection configuration.
///
/// Stores the append-only `price_history` snapshot table.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

/// Upstream HTTP providers.
///
/// - Stats: floor price, holders, listings and cumulative volume per collection
/// - CoinMarketCap: primary native/USD exchange rate
/// - CoinGecko: fallback native/USD exchange rate
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    #[serde(default = "default_stats_base_url")]
    pub stats_base_url: String,
    #[serde(default = "default_coinmarketcap_base_url")]
    pub coinmarketcap_base_url: String,
    #[serde(default)]
    pub coinmarketcap_api_key: Option<String>,
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    /// Attempts per provider before falling back (or giving up)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed delay between attempts, no backoff
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_stats_base_url() -> String {
    "https://api.modularium.art".to_string()
}

fn default_coinmarketcap_base_url() -> String {
    "https://pro-api.coinmarketcap.com/v2".to_string()
}

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            stats_base_url: default_stats_base_url(),
            coinmarketcap_base_url: default_coinmarketcap_base_url(),
            coinmarketcap_api_key: None,
            coingecko_base_url: default_coingecko_base_url(),
            coingecko_api_key: None,
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A tracked NFT collection.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionSettings {
    /// Contract address, used as the collection identifier everywhere
    pub address: String,
    /// Network slug used for exchange rate lookups (e.g. "ethereum")
    pub network_name: String,
    /// Total supply, used for market cap
    pub max_supply: f64,
    /// Display symbol of the native currency (e.g. "ETH")
    #[serde(default)]
    pub native_currency: Option<String>,
    /// First timestamp with data; default chart start time
    #[serde(default)]
    pub indexing_start_time: i64,
}

/// Response memoization for the query layer.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_capacity")]
    pub max_capacity: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_cache_max_capacity() -> u64 {
    1_000
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_capacity: default_cache_max_capacity(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` (or any format the `config` crate understands) at startup,
/// then overridden by `FLOORWATCH__SECTION__KEY` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub providers: ProviderSettings,
    #[serde(default)]
    pub collections: Vec<CollectionSettings>,
    #[serde(default)]
    pub cron: CronSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("FLOORWATCH").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Look up a configured collection, defaulting to the first one.
    pub fn collection(&self, address: Option<&str>) -> anyhow::Result<&CollectionSettings> {
        match address {
            Some(address) => self
                .collections
                .iter()
                .find(|c| c.address.eq_ignore_ascii_case(address))
                .ok_or_else(|| anyhow!("Collection {} is not configured", address)),
            None => self
                .collections
                .first()
                .ok_or_else(|| anyhow!("No collections configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SAMPLE: &str = r#"
postgres:
  host: localhost
  port: 5432
  user: floorwatch
  password: secret
  database: floorwatch
collections:
  - address: "0xAbC"
    network_name: ethereum
    max_supply: 10000
  - address: "0xdef"
    network_name: celestia
    max_supply: 5000
    native_currency: TIA
"#;

    fn sample() -> Settings {
        Config::builder()
            .add_source(File::from_str(SAMPLE, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_are_applied() {
        let settings = sample();
        assert_eq!(settings.postgres.pool_size, 16);
        assert_eq!(settings.providers.retry_attempts, 3);
        assert_eq!(settings.providers.retry_delay_ms, 1_000);
        assert_eq!(settings.cache.ttl_secs, 300);
        assert_eq!(settings.cron.update_interval_secs, 300);
        assert_eq!(settings.collections[0].indexing_start_time, 0);
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let policy = sample().providers.retry_policy();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_collection_lookup() {
        let settings = sample();
        assert_eq!(settings.collection(None).unwrap().address, "0xAbC");
        assert_eq!(settings.collection(Some("0xabc")).unwrap().max_supply, 10_000.0);
        assert_eq!(
            settings
                .collection(Some("0xdef"))
                .unwrap()
                .native_currency
                .as_deref(),
            Some("TIA")
        );
        assert!(settings.collection(Some("0x123")).is_err());
    }
}
