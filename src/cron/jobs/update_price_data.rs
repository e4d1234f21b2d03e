//! Job to append a price snapshot for a collection to PostgreSQL.
//!
//! Pulls floor price, holders, listings and cumulative volume from the stats API,
//! converts to USD with the native token rate, and derives the volume traded since
//! the previous snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{CollectionSettings, ProviderSettings};
use crate::db::models::{NewSnapshot, Snapshot};
use crate::db::SnapshotStore;
use crate::providers::{
    resolve_exchange_rate, CoinGeckoClient, CoinMarketCapClient, CollectionStats,
    CollectionStatsProvider, ExchangeRateProvider, ProviderError, StatsClient,
};
use crate::utils::{
    f64_to_decimal_string, now_unix, retry, validate_market_value, RetryPolicy,
};

/// Upstream sources used by the job.
#[derive(Clone)]
pub struct PriceFeeds {
    pub stats: Arc<dyn CollectionStatsProvider>,
    /// Tried first for the native/USD rate
    pub primary_rate: Arc<dyn ExchangeRateProvider>,
    /// Tried once the primary has used up its retries
    pub fallback_rate: Arc<dyn ExchangeRateProvider>,
    pub retry: RetryPolicy,
}

impl PriceFeeds {
    /// Stats API, CoinMarketCap as primary rate source, CoinGecko as fallback.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            stats: Arc::new(StatsClient::new(settings)?),
            primary_rate: Arc::new(CoinMarketCapClient::new(settings)?),
            fallback_rate: Arc::new(CoinGeckoClient::new(settings)?),
            retry: settings.retry_policy(),
        })
    }
}

/// Appends one snapshot for `collection`.
///
/// Nothing is written if the stats API or both rate providers fail.
pub async fn run(
    store: &dyn SnapshotStore,
    feeds: &PriceFeeds,
    collection: &CollectionSettings,
) -> Result<()> {
    info!("Starting update_price_data job for {}...", collection.address);

    let start = std::time::Instant::now();
    let network_name = collection.network_name.to_lowercase();

    let stats = retry(feeds.retry, "Collection stats", || {
        feeds.stats.collection_stats(&collection.address)
    })
    .await
    .with_context(|| format!("Failed to fetch stats for {}", collection.address))?;

    let rate = resolve_exchange_rate(
        feeds.primary_rate.as_ref(),
        feeds.fallback_rate.as_ref(),
        &network_name,
        feeds.retry,
    )
    .await?;

    let previous = store
        .latest_snapshot(&collection.address)
        .await
        .context("Failed to load latest snapshot")?;

    let snapshot = build_snapshot(collection, &stats, rate, previous.as_ref(), now_unix());

    store
        .insert_snapshot(&snapshot)
        .await
        .context("Failed to insert snapshot")?;

    info!(
        "Completed update_price_data job for {} in {:?} (floor {} {}, volume {})",
        collection.address,
        start.elapsed(),
        snapshot.price_native,
        snapshot.native_token,
        snapshot.volume_native
    );
    Ok(())
}

/// Runs the job for every collection, logging failures instead of stopping.
///
/// Returns the number of collections updated.
pub async fn run_all(
    store: &dyn SnapshotStore,
    feeds: &PriceFeeds,
    collections: &[CollectionSettings],
) -> usize {
    let mut updated = 0;

    for collection in collections {
        match run(store, feeds, collection).await {
            Ok(()) => updated += 1,
            Err(e) => warn!("Skipping {} this round: {:#}", collection.address, e),
        }
    }

    updated
}

/// Builds the row to append from fresh stats and the previous snapshot.
///
/// Volume is incremental: the cumulative total minus the previous snapshot's total
/// (zero when there is none), never negative.
pub fn build_snapshot(
    collection: &CollectionSettings,
    stats: &CollectionStats,
    rate: f64,
    previous: Option<&Snapshot>,
    timestamp: i64,
) -> NewSnapshot {
    let floor_price = validate_market_value(stats.floor_price);
    let total_volume = validate_market_value(stats.total_sales_volume);
    let previous_total = previous.map(Snapshot::total_volume_native).unwrap_or(0.0);

    let volume_native = (total_volume - previous_total).max(0.0);

    NewSnapshot {
        collection_address: collection.address.clone(),
        timestamp,
        price_native: f64_to_decimal_string(floor_price),
        price_usd: f64_to_decimal_string(floor_price * rate),
        volume_native: f64_to_decimal_string(volume_native),
        volume_usd: f64_to_decimal_string(volume_native * rate),
        holders: stats.holders.max(0),
        listing_qty: stats.num_listed.max(0),
        total_volume_native: f64_to_decimal_string(total_volume),
        native_token: collection.network_name.to_lowercase(),
    }
}
