//! Exchange rate and market value validation.
//!
//! Provider payloads are untrusted. A native token quoted at zero, a negative floor
//! price, or a rate in the billions are all signs of a broken response, and writing
//! them would poison every percentage change computed afterwards.

// ============================================
// Validation Constants
// ============================================

/// Maximum reasonable USD price of a native token.
/// No native token should exceed $1 million.
pub const MAX_NATIVE_USD_RATE: f64 = 1e6;

/// Minimum reasonable USD price of a native token.
pub const MIN_NATIVE_USD_RATE: f64 = 1e-6;

// ============================================
// Validation Helpers
// ============================================

/// Validate a native/USD exchange rate.
/// Returns Some(rate) if valid, None if invalid.
#[inline]
pub fn validate_exchange_rate(rate: f64) -> Option<f64> {
    if rate.is_finite() && (MIN_NATIVE_USD_RATE..=MAX_NATIVE_USD_RATE).contains(&rate) {
        Some(rate)
    } else {
        None
    }
}

/// Validate a non-negative market value (floor price, cumulative volume).
/// Returns the value if valid, 0.0 if invalid.
#[inline]
pub fn validate_market_value(value: f64) -> f64 {
    if value >= 0.0 && value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_exchange_rate() {
        assert_eq!(validate_exchange_rate(2.3), Some(2.3));
        assert_eq!(validate_exchange_rate(0.0), None);
        assert_eq!(validate_exchange_rate(-1.0), None);
        assert_eq!(validate_exchange_rate(f64::NAN), None);
        assert_eq!(validate_exchange_rate(1e9), None);
    }

    #[test]
    fn test_validate_market_value() {
        assert_eq!(validate_market_value(12.0), 12.0);
        assert_eq!(validate_market_value(0.0), 0.0);
        assert_eq!(validate_market_value(-3.0), 0.0);
        assert_eq!(validate_market_value(f64::INFINITY), 0.0);
    }
}
