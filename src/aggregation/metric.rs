//! Metric selection and per-metric value sets.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::AggregationError;
use crate::db::models::Snapshot;

/// Snapshot field selected for aggregation.
///
/// The serialized names are the ones used by the charting frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "priceNative")]
    PriceNative,
    #[serde(rename = "priceUsd")]
    PriceUsd,
    #[serde(rename = "listingQty")]
    ListingQty,
    #[serde(rename = "holders")]
    Holders,
    #[serde(rename = "volumeNativeToken")]
    VolumeNative,
    #[serde(rename = "volumeUsd")]
    VolumeUsd,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::PriceNative,
        Metric::PriceUsd,
        Metric::ListingQty,
        Metric::Holders,
        Metric::VolumeNative,
        Metric::VolumeUsd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::PriceNative => "priceNative",
            Metric::PriceUsd => "priceUsd",
            Metric::ListingQty => "listingQty",
            Metric::Holders => "holders",
            Metric::VolumeNative => "volumeNativeToken",
            Metric::VolumeUsd => "volumeUsd",
        }
    }

    /// Metrics without meaningful OHLC form. These aggregate to a close-only series.
    pub fn is_single_value(self) -> bool {
        matches!(
            self,
            Metric::Holders | Metric::ListingQty | Metric::VolumeNative | Metric::VolumeUsd
        )
    }

    /// Field accessor for this metric. Resolve once per call, then apply per snapshot.
    pub fn accessor(self) -> fn(&Snapshot) -> f64 {
        match self {
            Metric::PriceNative => Snapshot::price_native,
            Metric::PriceUsd => Snapshot::price_usd,
            Metric::ListingQty => Snapshot::listing_qty,
            Metric::Holders => Snapshot::holders,
            Metric::VolumeNative => Snapshot::volume_native,
            Metric::VolumeUsd => Snapshot::volume_usd,
        }
    }

    #[inline]
    pub fn value_of(self, snapshot: &Snapshot) -> f64 {
        (self.accessor())(snapshot)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| AggregationError::UnknownMetric(s.to_string()))
    }
}

/// One number per metric.
///
/// Used both for the current metric values of a collection and for the percentage
/// changes of one lookback window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValues {
    pub price_native: f64,
    pub price_usd: f64,
    pub listing_qty: f64,
    pub holders: f64,
    #[serde(rename = "volumeNativeToken")]
    pub volume_native: f64,
    pub volume_usd: f64,
}

impl MetricValues {
    /// Build a value set by evaluating `f` for every metric.
    pub fn from_fn(mut f: impl FnMut(Metric) -> f64) -> Self {
        Self {
            price_native: f(Metric::PriceNative),
            price_usd: f(Metric::PriceUsd),
            listing_qty: f(Metric::ListingQty),
            holders: f(Metric::Holders),
            volume_native: f(Metric::VolumeNative),
            volume_usd: f(Metric::VolumeUsd),
        }
    }

    /// Metric values of a snapshot, or all zeros when there is none.
    pub fn of(snapshot: Option<&Snapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self::from_fn(|metric| metric.value_of(snapshot)),
            None => Self::default(),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PriceNative => self.price_native,
            Metric::PriceUsd => self.price_usd,
            Metric::ListingQty => self.listing_qty,
            Metric::Holders => self.holders,
            Metric::VolumeNative => self.volume_native,
            Metric::VolumeUsd => self.volume_usd,
        }
    }
}
