use thiserror::Error;

/// Caller contract violations raised by the aggregation engine.
///
/// Bad data never ends up here (unparseable metrics read as zero); these errors mean
/// the caller asked for something the engine does not know how to compute.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown time interval: {0}")]
    UnknownInterval(String),

    #[error("Bucket width must be positive, got {0}s")]
    InvalidBucketWidth(i64),

    #[error("Lookback window {name} must have a positive width, got {width_secs}s")]
    InvalidWindow { name: String, width_secs: i64 },
}
