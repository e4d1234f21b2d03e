use async_trait::async_trait;
use log::debug;
use reqwest::{header::HeaderMap, Client};

use super::{
    build_client, endpoint, fetch_json, CollectionStats, CollectionStatsProvider, ProviderError,
};
use crate::config::ProviderSettings;

/// Client for the collection stats API (`GET /stats/{address}`).
#[derive(Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = build_client(HeaderMap::new(), settings.request_timeout())?;

        Ok(Self {
            client,
            base_url: settings.stats_base_url.clone(),
        })
    }
}

#[async_trait]
impl CollectionStatsProvider for StatsClient {
    async fn collection_stats(
        &self,
        collection_address: &str,
    ) -> Result<CollectionStats, ProviderError> {
        let url = endpoint(&self.base_url, &format!("stats/{}", collection_address));
        debug!("Fetching collection stats from {}", url);

        fetch_json::<CollectionStats>(self.client.get(url)).await
    }
}
