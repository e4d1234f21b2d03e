use serde::Serialize;

use crate::aggregation::{
    compute_changes, current_metrics, AggregationError, LookbackWindow, MetricChangeSet,
    MetricValues,
};
use crate::db::models::Snapshot;

/// Headline numbers for a collection over the last 24 hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOverview {
    pub holders: i64,
    pub num_listed: i64,
    pub floor_price_native: f64,
    pub floor_price_usd: f64,
    pub market_cap_native: f64,
    pub market_cap_usd: f64,
    pub volume_24h_native: f64,
    pub volume_24h_usd: f64,
    pub native_currency: Option<String>,
    pub current: MetricValues,
    pub percentage_changes: MetricChangeSet,
}

/// Summarise a day of snapshots.
///
/// Holders, listings and floor prices come from the latest snapshot; volumes are
/// summed over every record. Market cap is `floor * max_supply`. Changes are
/// computed over the default lookback windows, bounded by whatever `records` spans.
pub fn collection_overview(
    records: &[Snapshot],
    max_supply: f64,
    native_currency: Option<String>,
    now: i64,
) -> Result<CollectionOverview, AggregationError> {
    let latest = records.iter().fold(None::<&Snapshot>, |latest, s| match latest {
        Some(l) if l.timestamp >= s.timestamp => Some(l),
        _ => Some(s),
    });

    let floor_price_native = latest.map(Snapshot::price_native).unwrap_or(0.0);
    let floor_price_usd = latest.map(Snapshot::price_usd).unwrap_or(0.0);

    Ok(CollectionOverview {
        holders: latest.and_then(|s| s.holders).unwrap_or(0),
        num_listed: latest.and_then(|s| s.listing_qty).unwrap_or(0),
        floor_price_native,
        floor_price_usd,
        market_cap_native: floor_price_native * max_supply,
        market_cap_usd: floor_price_usd * max_supply,
        volume_24h_native: records.iter().map(Snapshot::volume_native).sum(),
        volume_24h_usd: records.iter().map(Snapshot::volume_usd).sum(),
        native_currency,
        current: current_metrics(records),
        percentage_changes: compute_changes(records, &LookbackWindow::defaults(), now)?,
    })
}
