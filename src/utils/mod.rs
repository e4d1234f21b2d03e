//! Utility functions for floorwatch.
//!
//! This module is organized into focused submodules:
//!
//! - [`conversion`] - Decimal string parsing, rendering and rounding
//! - [`validation`] - Exchange rate and market value bounds
//! - [`time`] - Unix timestamp helpers
//! - [`retry`] - Bounded retry with a fixed delay

mod conversion;
mod retry;
mod time;
mod validation;

// ============================================
// Common Constants
// ============================================

/// Length of the lookback used for collection overviews (24 hours).
pub const OVERVIEW_SPAN_SECS: i64 = 86_400;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{decimal_to_f64, f64_to_decimal_string, parse_decimal, round_to_significant};

// Retry utilities
pub use retry::{retry, RetryPolicy};

// Time utilities
pub use time::{align_down, now_unix};

// Validation utilities
pub use validation::{
    validate_exchange_rate, validate_market_value, MAX_NATIVE_USD_RATE, MIN_NATIVE_USD_RATE,
};
