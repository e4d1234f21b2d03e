//! Unix timestamp helpers.

use chrono::Utc;

/// Current Unix time in whole seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Align a timestamp down to a multiple of `width_secs`.
///
/// Uses floor division so negative timestamps align towards negative infinity.
/// `width_secs` must be positive.
#[inline]
pub fn align_down(timestamp: i64, width_secs: i64) -> i64 {
    timestamp.div_euclid(width_secs) * width_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_down() {
        assert_eq!(align_down(0, 60), 0);
        assert_eq!(align_down(59, 60), 0);
        assert_eq!(align_down(60, 60), 60);
        assert_eq!(align_down(125, 60), 120);
        assert_eq!(align_down(-1, 60), -60);
    }
}
