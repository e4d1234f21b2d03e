//! Percentage change of every metric over rolling lookback windows.
//!
//! The latest snapshot is compared against the oldest snapshot that still falls
//! inside each window, where windows are anchored at the latest snapshot's time
//! (not at wall-clock now) so a stalled ingestion job does not zero out the changes.

use indexmap::IndexMap;

use super::{AggregationError, LookbackWindow, Metric, MetricValues};
use crate::db::models::Snapshot;

/// Window name to per-metric percentage change, in the order the windows were given.
pub type MetricChangeSet = IndexMap<String, MetricValues>;

/// Percentage change from `previous` to `current`.
///
/// Returns `0.0` when `previous` is zero (a metric appearing for the first time is
/// not an infinite spike) and whenever the result would not be finite.
#[inline]
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }

    let change = (current - previous) / previous * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

/// Per-metric percentage change between two value sets.
pub fn metric_changes(current: &MetricValues, previous: &MetricValues) -> MetricValues {
    MetricValues::from_fn(|metric: Metric| {
        percentage_change(current.get(metric), previous.get(metric))
    })
}

/// Latest snapshot first; equal timestamps keep their input order.
fn sorted_descending(records: &[Snapshot]) -> Vec<&Snapshot> {
    let mut ordered: Vec<&Snapshot> = records.iter().collect();
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    ordered
}

/// Metric values of the most recent snapshot, all zeros if there is none.
pub fn current_metrics(records: &[Snapshot]) -> MetricValues {
    MetricValues::of(sorted_descending(records).first().copied())
}

/// Compute percentage changes for every lookback window.
///
/// * `records` - snapshot history of one collection, in any order
/// * `windows` - lookback windows, reported in the same order
/// * `now` - anchor used only when `records` is empty
///
/// With no records every change is zero.
///
/// # Errors
/// * [`AggregationError::InvalidWindow`] if a window width is not positive
pub fn compute_changes(
    records: &[Snapshot],
    windows: &[LookbackWindow],
    now: i64,
) -> Result<MetricChangeSet, AggregationError> {
    if let Some(window) = windows.iter().find(|w| w.width_secs <= 0) {
        return Err(AggregationError::InvalidWindow {
            name: window.name.clone(),
            width_secs: window.width_secs,
        });
    }

    let ordered = sorted_descending(records);
    let latest = ordered.first().copied();
    let current = MetricValues::of(latest);
    let latest_time = latest.map(|s| s.timestamp).unwrap_or(now);

    let mut changes = MetricChangeSet::with_capacity(windows.len());

    for window in windows {
        let cutoff = latest_time.saturating_sub(window.width_secs);

        let mut in_window: Vec<&Snapshot> = ordered
            .iter()
            .copied()
            .filter(|snapshot| snapshot.timestamp >= cutoff)
            .collect();
        // Oldest last, independent of how the history was handed to us
        in_window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let previous = MetricValues::of(in_window.last().copied());
        changes.insert(window.name.clone(), metric_changes(&current, &previous));
    }

    Ok(changes)
}
