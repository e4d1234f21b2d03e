//! Fixed-width time bucketing of snapshot metrics.
//!
//! Snapshots arrive at irregular times. Charts want one point per interval, so every
//! snapshot is assigned to the epoch-aligned bucket `floor(t / width) * width` and each
//! bucket is reduced to OHLC (prices) or to its close value (counts and volumes).
//!
//! Buckets only exist for intervals that contain at least one snapshot. Gaps in the
//! data stay gaps in the output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AggregationError, Metric};
use crate::{db::models::Snapshot, utils::align_down};

/// Parameters of one aggregation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateQuery {
    /// Inclusive lower bound on snapshot timestamps.
    pub start_time: Option<i64>,
    /// Inclusive upper bound on snapshot timestamps.
    pub end_time: Option<i64>,
    pub metric: Metric,
    pub bucket_width_secs: i64,
}

impl AggregateQuery {
    pub fn new(metric: Metric, bucket_width_secs: i64) -> Self {
        Self {
            start_time: None,
            end_time: None,
            metric,
            bucket_width_secs,
        }
    }

    pub fn with_bounds(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    fn contains(&self, timestamp: i64) -> bool {
        self.start_time.is_none_or(|start| timestamp >= start)
            && self.end_time.is_none_or(|end| timestamp <= end)
    }
}

/// Candle for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcPoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Close value for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub time: i64,
    pub value: f64,
}

/// Bucketed output, ascending by `time`.
///
/// Serialized untagged so the frontend receives a bare array of either shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Ohlc(Vec<OhlcPoint>),
    Value(Vec<ValuePoint>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Ohlc(points) => points.len(),
            Series::Value(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket start times in output order.
    pub fn times(&self) -> Vec<i64> {
        match self {
            Series::Ohlc(points) => points.iter().map(|p| p.time).collect(),
            Series::Value(points) => points.iter().map(|p| p.time).collect(),
        }
    }
}

/// Running OHLC accumulator.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Bucket {
    fn new(value: f64) -> Self {
        Self {
            open: value,
            high: value,
            low: value,
            close: value,
        }
    }

    /// Fold in a value that is not earlier than anything seen so far.
    fn push(&mut self, value: f64) {
        self.high = self.high.max(value);
        self.low = self.low.min(value);
        self.close = value;
    }
}

/// Bucket snapshots by time and reduce each bucket for the requested metric.
///
/// Input order does not matter: snapshots are stable-sorted by timestamp first, so
/// snapshots sharing a timestamp keep their input order (the later one becomes close).
/// Metric values that are missing or unparseable count as `0.0`.
///
/// # Errors
/// * [`AggregationError::InvalidBucketWidth`] if `bucket_width_secs <= 0`
pub fn aggregate(records: &[Snapshot], query: &AggregateQuery) -> Result<Series, AggregationError> {
    let width = query.bucket_width_secs;
    if width <= 0 {
        return Err(AggregationError::InvalidBucketWidth(width));
    }

    let mut ordered: Vec<&Snapshot> = records
        .iter()
        .filter(|snapshot| query.contains(snapshot.timestamp))
        .collect();
    // close = last value processed, so this ordering is load-bearing
    ordered.sort_by_key(|snapshot| snapshot.timestamp);

    let value_of = query.metric.accessor();
    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();

    for snapshot in ordered {
        let value = value_of(snapshot);
        let key = align_down(snapshot.timestamp, width);

        buckets
            .entry(key)
            .and_modify(|bucket| bucket.push(value))
            .or_insert_with(|| Bucket::new(value));
    }

    let series = if query.metric.is_single_value() {
        Series::Value(
            buckets
                .into_iter()
                .map(|(time, bucket)| ValuePoint {
                    time,
                    value: bucket.close,
                })
                .collect(),
        )
    } else {
        Series::Ohlc(
            buckets
                .into_iter()
                .map(|(time, bucket)| OhlcPoint {
                    time,
                    open: bucket.open,
                    high: bucket.high,
                    low: bucket.low,
                    close: bucket.close,
                })
                .collect(),
        )
    };

    Ok(series)
}
