use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;

use super::{build_client, endpoint, fetch_json, ExchangeRateProvider, ProviderError};
use crate::{config::ProviderSettings, utils::validate_exchange_rate};

const NAME: &str = "coingecko";

/// CoinGecko coins API, used when CoinMarketCap is unavailable.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &settings.coingecko_api_key {
            headers.insert("x-cg-demo-api-key", HeaderValue::from_str(api_key)?);
        }

        let client = build_client(headers, settings.request_timeout())?;

        Ok(Self {
            client,
            base_url: settings.coingecko_base_url.clone(),
        })
    }
}

#[async_trait]
impl ExchangeRateProvider for CoinGeckoClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn native_usd_rate(&self, network_name: &str) -> Result<f64, ProviderError> {
        let url = endpoint(&self.base_url, &format!("coins/{}", network_name));

        let response = fetch_json::<CoinResponse>(self.client.get(url)).await?;
        rate_from_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: CurrentPrice,
}

#[derive(Debug, Deserialize)]
struct CurrentPrice {
    usd: Option<f64>,
}

fn rate_from_response(response: CoinResponse) -> Result<f64, ProviderError> {
    let rate = response
        .market_data
        .current_price
        .usd
        .ok_or_else(|| ProviderError::Response("no USD price in CoinGecko response".into()))?;

    validate_exchange_rate(rate).ok_or(ProviderError::InvalidRate {
        provider: NAME,
        rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<f64, ProviderError> {
        rate_from_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_reads_usd_price() {
        let rate = parse(
            r#"{"id": "celestia", "market_data": {"current_price": {"usd": 5.67, "eur": 5.1}}}"#,
        )
        .unwrap();
        assert_eq!(rate, 5.67);
    }

    #[test]
    fn test_missing_usd_price_is_an_error() {
        assert!(matches!(
            parse(r#"{"market_data": {"current_price": {"eur": 5.1}}}"#),
            Err(ProviderError::Response(_))
        ));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        assert!(matches!(
            parse(r#"{"market_data": {"current_price": {"usd": -1.0}}}"#),
            Err(ProviderError::InvalidRate { .. })
        ));
    }
}
