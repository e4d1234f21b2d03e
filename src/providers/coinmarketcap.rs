use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;

use super::{build_client, endpoint, fetch_json, ExchangeRateProvider, ProviderError};
use crate::{config::ProviderSettings, utils::validate_exchange_rate};

const NAME: &str = "coinmarketcap";

/// CoinMarketCap quotes API, the primary exchange rate source.
#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
}

impl CoinMarketCapClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &settings.coinmarketcap_api_key {
            headers.insert("X-CMC_PRO_API_KEY", HeaderValue::from_str(api_key)?);
        }

        let client = build_client(headers, settings.request_timeout())?;

        Ok(Self {
            client,
            base_url: settings.coinmarketcap_base_url.clone(),
        })
    }
}

#[async_trait]
impl ExchangeRateProvider for CoinMarketCapClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn native_usd_rate(&self, network_name: &str) -> Result<f64, ProviderError> {
        let url = endpoint(&self.base_url, "cryptocurrency/quotes/latest");
        let request = self.client.get(url).query(&[("slug", network_name)]);

        let response = fetch_json::<QuotesResponse>(request).await?;
        rate_from_response(response)
    }
}

/// `data` is keyed by CoinMarketCap id; a slug lookup yields a single entry.
#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: IndexMap<String, Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    quote: QuoteCurrencies,
}

#[derive(Debug, Deserialize)]
struct QuoteCurrencies {
    #[serde(rename = "USD")]
    usd: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: f64,
}

fn rate_from_response(response: QuotesResponse) -> Result<f64, ProviderError> {
    let (_, quote) = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Response("no quotes in CoinMarketCap response".into()))?;

    let rate = quote.quote.usd.price;
    validate_exchange_rate(rate).ok_or(ProviderError::InvalidRate {
        provider: NAME,
        rate,
    })
}
