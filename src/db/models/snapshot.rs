use serde::{Deserialize, Serialize};

use crate::utils::decimal_to_f64;

/// Point-in-time observation of a collection's market metrics.
///
/// Population: the `update_price_data` job appends one row per collection per run.
/// Rows are never updated or deleted afterwards.
///
/// Query Patterns:
///   - "Get price history for collection X between start and end" (ascending)
///   - "Get the last 24h of snapshots for collection X" (descending)
///   - "Get the latest snapshot for collection X" (for incremental volume)
///
/// Prices and volumes are kept as decimal strings (Postgres NUMERIC read back as text)
/// and only converted to `f64` at aggregation time. Any metric may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub collection_address: String,
    pub timestamp: i64,

    // Prices
    pub price_native: Option<String>,
    pub price_usd: Option<String>,

    // Activity since the previous snapshot
    #[serde(rename = "volumeNativeToken")]
    pub volume_native: Option<String>,
    pub volume_usd: Option<String>,

    // Collection state
    pub holders: Option<i64>,
    pub listing_qty: Option<i64>,

    /// Cumulative native volume as reported by the stats provider.
    #[serde(rename = "totalVolumeNativeToken")]
    pub total_volume_native: Option<String>,
    pub native_token: Option<String>,
}

impl Snapshot {
    /// Snapshot with only the identifying fields set. Every metric reads as zero.
    pub fn empty(collection_address: impl Into<String>, timestamp: i64) -> Self {
        Self {
            collection_address: collection_address.into(),
            timestamp,
            price_native: None,
            price_usd: None,
            volume_native: None,
            volume_usd: None,
            holders: None,
            listing_qty: None,
            total_volume_native: None,
            native_token: None,
        }
    }

    pub fn price_native(&self) -> f64 {
        decimal_to_f64(self.price_native.as_deref())
    }

    pub fn price_usd(&self) -> f64 {
        decimal_to_f64(self.price_usd.as_deref())
    }

    pub fn volume_native(&self) -> f64 {
        decimal_to_f64(self.volume_native.as_deref())
    }

    pub fn volume_usd(&self) -> f64 {
        decimal_to_f64(self.volume_usd.as_deref())
    }

    pub fn holders(&self) -> f64 {
        self.holders.map(|v| v as f64).unwrap_or(0.0)
    }

    pub fn listing_qty(&self) -> f64 {
        self.listing_qty.map(|v| v as f64).unwrap_or(0.0)
    }

    pub fn total_volume_native(&self) -> f64 {
        decimal_to_f64(self.total_volume_native.as_deref())
    }
}

/// Row to be appended to `price_history`.
///
/// Built by the ingestion job from provider data; all numeric fields are already
/// rendered as decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub collection_address: String,
    pub timestamp: i64,
    pub price_native: String,
    pub price_usd: String,
    pub volume_native: String,
    pub volume_usd: String,
    pub holders: i64,
    pub listing_qty: i64,
    pub total_volume_native: String,
    pub native_token: String,
}

impl From<NewSnapshot> for Snapshot {
    fn from(row: NewSnapshot) -> Self {
        Self {
            collection_address: row.collection_address,
            timestamp: row.timestamp,
            price_native: Some(row.price_native),
            price_usd: Some(row.price_usd),
            volume_native: Some(row.volume_native),
            volume_usd: Some(row.volume_usd),
            holders: Some(row.holders),
            listing_qty: Some(row.listing_qty),
            total_volume_native: Some(row.total_volume_native),
            native_token: Some(row.native_token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metrics_read_as_zero() {
        let snapshot = Snapshot::empty("0xabc", 10);
        assert_eq!(snapshot.price_native(), 0.0);
        assert_eq!(snapshot.volume_usd(), 0.0);
        assert_eq!(snapshot.holders(), 0.0);
        assert_eq!(snapshot.listing_qty(), 0.0);
    }

    #[test]
    fn test_unparseable_metric_reads_as_zero() {
        let snapshot = Snapshot {
            price_native: Some("not-a-number".to_string()),
            price_usd: Some("12.50".to_string()),
            ..Snapshot::empty("0xabc", 10)
        };
        assert_eq!(snapshot.price_native(), 0.0);
        assert_eq!(snapshot.price_usd(), 12.5);
    }

    #[test]
    fn test_serializes_with_frontend_field_names() {
        let snapshot = Snapshot {
            volume_native: Some("1.5".to_string()),
            listing_qty: Some(4),
            ..Snapshot::empty("0xabc", 10)
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["volumeNativeToken"], "1.5");
        assert_eq!(json["listingQty"], 4);
        assert_eq!(json["collectionAddress"], "0xabc");
    }
}
