//! Time-series aggregation engine.
//!
//! Pure functions over already-fetched snapshots:
//!
//! - [`aggregate`] - bucket snapshots into fixed-width OHLC or value series
//! - [`heikin_ashi`] - smooth an OHLC series into Heikin-Ashi candles
//! - [`compute_changes`] - percentage change per metric over lookback windows
//!
//! Nothing in here performs I/O or holds state between calls.

mod bucket;
mod changes;
mod error;
mod heikin_ashi;
mod interval;
mod metric;

pub use bucket::{aggregate, AggregateQuery, OhlcPoint, Series, ValuePoint};
pub use changes::{
    compute_changes, current_metrics, metric_changes, percentage_change, MetricChangeSet,
};
pub use error::AggregationError;
pub use heikin_ashi::heikin_ashi;
pub use interval::{LookbackWindow, TimeInterval};
pub use metric::{Metric, MetricValues};
