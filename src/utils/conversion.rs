//! Decimal string conversion utilities.
//!
//! Snapshot metrics travel as decimal strings (Postgres NUMERIC rendered as text)
//! and are only turned into `f64` when aggregated. Conversion never fails: anything
//! that cannot be read as a finite number becomes `0.0`.

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use std::str::FromStr;

// ============================================
// String to f64 Conversions
// ============================================

/// Parse a decimal string to a finite `f64`.
///
/// Uses BigDecimal so that plain and exponent notation ("12.5", "1.2e3") are both
/// accepted while "NaN"/"inf" spellings are rejected.
///
/// # Returns
/// * `Some(f64)` if the string is a finite decimal, `None` otherwise
pub fn parse_decimal(value_str: &str) -> Option<f64> {
    let big_value = BigDecimal::from_str(value_str.trim()).ok()?;

    let result = big_value.to_f64()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

/// Read an optional decimal string as `f64`, treating missing or unparseable values as zero.
#[inline]
pub fn decimal_to_f64(value: Option<&str>) -> f64 {
    value.and_then(parse_decimal).unwrap_or(0.0)
}

// ============================================
// f64 to String Conversions
// ============================================

/// Render an `f64` as a decimal string suitable for a NUMERIC column.
///
/// Non-finite values are stored as "0" rather than NaN.
pub fn f64_to_decimal_string(value: f64) -> String {
    if value.is_finite() {
        // Display for f64 never uses exponent notation
        value.to_string()
    } else {
        "0".to_string()
    }
}

// ============================================
// Rounding
// ============================================

/// Round to a number of significant digits (`toPrecision` semantics).
///
/// `round_to_significant(2345.6, 2) == 2300.0`, `round_to_significant(0.012345, 2) == 0.012`.
pub fn round_to_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = digits as i32 - 1 - magnitude;

    // Round through the decimal representation for fractional scales
    if scale >= 0 {
        format!("{:.*}", scale as usize, value)
            .parse()
            .unwrap_or(value)
    } else {
        let factor = 10f64.powi(-scale);
        (value / factor).round() * factor
    }
}
