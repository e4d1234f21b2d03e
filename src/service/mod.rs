//! Cached read side: price series and collection overviews.
//!
//! Results are memoized in `moka` caches for the configured TTL, so repeated
//! chart requests within a few minutes hit PostgreSQL once.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::debug;
use moka::future::Cache;

use crate::aggregation::{aggregate, AggregateQuery, Metric, Series, TimeInterval};
use crate::config::{CacheSettings, CollectionSettings};
use crate::db::SnapshotStore;
use crate::utils::{align_down, now_unix, OVERVIEW_SPAN_SECS};

mod overview;

pub use overview::{collection_overview, CollectionOverview};

/// A chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub metric: Metric,
    pub interval: TimeInterval,
}

impl SeriesRequest {
    pub fn new(metric: Metric, interval: TimeInterval) -> Self {
        Self {
            start_time: None,
            end_time: None,
            metric,
            interval,
        }
    }

    /// Fill missing bounds: start at the collection's indexing start, end at the
    /// last interval boundary before `now`.
    pub fn resolve_bounds(&self, collection: &CollectionSettings, now: i64) -> (i64, i64) {
        let start = self.start_time.unwrap_or(collection.indexing_start_time);
        let end = self
            .end_time
            .unwrap_or_else(|| align_down(now, self.interval.seconds()));
        (start, end)
    }
}

#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn SnapshotStore>,
    series: Cache<String, Arc<Series>>,
    overviews: Cache<String, Arc<CollectionOverview>>,
}

impl CollectionService {
    pub fn new(store: Arc<dyn SnapshotStore>, settings: &CacheSettings) -> Self {
        let ttl = Duration::from_secs(settings.ttl_secs);

        let series = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(ttl)
            .build();
        let overviews = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            store,
            series,
            overviews,
        }
    }

    /// Bucketed series of one metric for a collection.
    pub async fn get_latest(
        &self,
        collection: &CollectionSettings,
        request: &SeriesRequest,
    ) -> Result<Arc<Series>> {
        let (start, end) = request.resolve_bounds(collection, now_unix());
        let key = format!(
            "price-history-{}-{}-{}-{}-{}",
            collection.address, request.interval, request.metric, start, end
        );

        let query = AggregateQuery::new(request.metric, request.interval.seconds())
            .with_bounds(Some(start), Some(end));

        self.series
            .try_get_with(key, async {
                debug!(
                    "Loading {} series for {} ({}..={})",
                    request.metric, collection.address, start, end
                );
                let records = self
                    .store
                    .snapshots_in_range(&collection.address, Some(start), Some(end))
                    .await
                    .context("Failed to load price history")?;

                let series = aggregate(&records, &query)?;
                Ok::<_, anyhow::Error>(Arc::new(series))
            })
            .await
            .map_err(|e| anyhow!("{:#}", e))
    }

    /// 24h overview of a collection.
    pub async fn get_collection_data(
        &self,
        collection: &CollectionSettings,
    ) -> Result<Arc<CollectionOverview>> {
        let key = format!("collection-data-{}", collection.address);

        self.overviews
            .try_get_with(key, async {
                let now = now_unix();
                let records = self
                    .store
                    .snapshots_since(&collection.address, now - OVERVIEW_SPAN_SECS)
                    .await
                    .context("Failed to load last 24h of snapshots")?;

                debug!(
                    "Building overview for {} from {} snapshots",
                    collection.address,
                    records.len()
                );

                let overview = collection_overview(
                    &records,
                    collection.max_supply,
                    collection.native_currency.clone(),
                    now,
                )?;
                Ok::<_, anyhow::Error>(Arc::new(overview))
            })
            .await
            .map_err(|e| anyhow!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Snapshot;
    use crate::testing::{collection, MemoryStore};

    fn price(timestamp: i64, price: &str) -> Snapshot {
        Snapshot {
            price_native: Some(price.to_string()),
            holders: Some(10),
            ..Snapshot::empty("0xabc", timestamp)
        }
    }

    fn service(store: Arc<MemoryStore>) -> CollectionService {
        CollectionService::new(store, &CacheSettings::default())
    }

    #[test]
    fn test_resolve_bounds_defaults() {
        let mut collection = collection("0xabc");
        collection.indexing_start_time = 1_000;
        let request = SeriesRequest::new(Metric::PriceNative, TimeInterval::FifteenMinutes);

        assert_eq!(request.resolve_bounds(&collection, 10_000), (1_000, 9_900));
    }

    #[test]
    fn test_resolve_bounds_explicit() {
        let request = SeriesRequest {
            start_time: Some(50),
            end_time: Some(10_000),
            ..SeriesRequest::new(Metric::Holders, TimeInterval::OneDay)
        };

        assert_eq!(request.resolve_bounds(&collection("0xabc"), 99_999), (50, 10_000));
    }

    #[tokio::test]
    async fn test_get_latest_aggregates_and_caches() {
        let store = Arc::new(MemoryStore::with_rows(vec![
            price(0, "1"),
            price(60, "3"),
            price(120, "2"),
            price(900, "5"),
        ]));
        let service = service(store.clone());
        let request = SeriesRequest {
            end_time: Some(1_000),
            ..SeriesRequest::new(Metric::PriceNative, TimeInterval::FifteenMinutes)
        };

        let series = service.get_latest(&collection("0xabc"), &request).await.unwrap();

        let Series::Ohlc(points) = series.as_ref() else {
            panic!("price series should be OHLC");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(
            (points[0].time, points[0].open, points[0].high, points[0].low, points[0].close),
            (0, 1.0, 3.0, 1.0, 2.0)
        );
        assert_eq!(points[1].time, 900);

        service.get_latest(&collection("0xabc"), &request).await.unwrap();
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_get_latest_keys_on_metric() {
        let store = Arc::new(MemoryStore::with_rows(vec![price(0, "1")]));
        let service = service(store.clone());
        let collection = collection("0xabc");
        let price_request = SeriesRequest {
            end_time: Some(100),
            ..SeriesRequest::new(Metric::PriceNative, TimeInterval::FiveMinutes)
        };
        let holders_request = SeriesRequest {
            metric: Metric::Holders,
            ..price_request.clone()
        };

        let prices = service.get_latest(&collection, &price_request).await.unwrap();
        let holders = service.get_latest(&collection, &holders_request).await.unwrap();

        assert!(matches!(prices.as_ref(), Series::Ohlc(_)));
        let Series::Value(points) = holders.as_ref() else {
            panic!("holders series should be close-only");
        };
        assert_eq!(points[0].value, 10.0);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_get_collection_data_reads_last_day() {
        let now = now_unix();
        let store = Arc::new(MemoryStore::with_rows(vec![
            price(now - 2 * OVERVIEW_SPAN_SECS, "100"),
            price(now - 60, "2"),
            price(now - 30, "4"),
        ]));
        let service = service(store.clone());

        let overview = service
            .get_collection_data(&collection("0xabc"))
            .await
            .unwrap();

        assert_eq!(overview.floor_price_native, 4.0);
        assert_eq!(overview.market_cap_native, 4_000.0);
        assert_eq!(overview.holders, 10);
        assert_eq!(overview.percentage_changes["1d"].price_native, 100.0);
        assert_eq!(overview.native_currency.as_deref(), Some("ETH"));

        service
            .get_collection_data(&collection("0xabc"))
            .await
            .unwrap();
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_get_collection_data_for_unknown_collection_is_empty() {
        let service = service(Arc::new(MemoryStore::default()));

        let overview = service
            .get_collection_data(&collection("0xnone"))
            .await
            .unwrap();

        assert_eq!(overview.holders, 0);
        assert_eq!(overview.volume_24h_usd, 0.0);
    }
}
