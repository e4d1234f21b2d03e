//! Upstream HTTP data providers.
//!
//! - [`StatsClient`] - collection stats (floor price, holders, listings, volume)
//! - [`CoinMarketCapClient`] - primary native/USD exchange rate
//! - [`CoinGeckoClient`] - fallback native/USD exchange rate
//!
//! The ingestion job only sees the [`CollectionStatsProvider`] and
//! [`ExchangeRateProvider`] traits, so tests can swap in canned providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};

mod coingecko;
mod coinmarketcap;
mod errors;
mod exchange_rate;
mod stats;

pub use coingecko::CoinGeckoClient;
pub use coinmarketcap::CoinMarketCapClient;
pub use errors::ProviderError;
pub use exchange_rate::resolve_exchange_rate;
pub use stats::StatsClient;

/// Collection statistics as reported by the stats API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionStats {
    pub num_minted: f64,
    pub primary_volume: f64,
    pub total_sales_qty: f64,
    /// Cumulative secondary volume in the native token
    pub total_sales_volume: f64,
    pub max_sale_price: f64,
    pub min_sale_price: f64,
    pub avg_sale_price: f64,
    /// Floor price in the native token
    pub floor_price: f64,
    pub num_listed: i64,
    pub holders: i64,
}

/// Source of per-collection statistics.
#[async_trait]
pub trait CollectionStatsProvider: Send + Sync {
    async fn collection_stats(
        &self,
        collection_address: &str,
    ) -> Result<CollectionStats, ProviderError>;
}

/// Source of the native token's USD price.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// USD price of one native token of `network_name` (e.g. "ethereum").
    async fn native_usd_rate(&self, network_name: &str) -> Result<f64, ProviderError>;
}

/// Build an HTTP client with provider-wide headers and timeout.
pub(crate) fn build_client(headers: HeaderMap, timeout: Duration) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Send a request and decode a JSON body, turning non-success statuses into
/// [`ProviderError::Api`].
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown API error".to_string());
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}

/// Join a base URL and a path without doubling or dropping the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(endpoint("https://a.io", "stats/0x1"), "https://a.io/stats/0x1");
        assert_eq!(endpoint("https://a.io/", "/stats/0x1"), "https://a.io/stats/0x1");
        assert_eq!(endpoint("https://a.io/v2", "coins/eth"), "https://a.io/v2/coins/eth");
    }

    #[test]
    fn test_collection_stats_decoding_tolerates_missing_fields() {
        let stats: CollectionStats = serde_json::from_str(
            r#"{"floorPrice": 0.42, "totalSalesVolume": 1234.5, "numListed": 17, "holders": 2048}"#,
        )
        .unwrap();

        assert_eq!(stats.floor_price, 0.42);
        assert_eq!(stats.total_sales_volume, 1234.5);
        assert_eq!(stats.num_listed, 17);
        assert_eq!(stats.holders, 2048);
        assert_eq!(stats.num_minted, 0.0);
    }
}
