use super::OhlcPoint;

/// Convert a bucketed OHLC series into Heikin-Ashi candles.
///
/// For each bucket `i`:
/// - `ha_close = (open + high + low + close) / 4`
/// - `ha_open = (open + close) / 2` for the first bucket, otherwise
///   `(ha_open[i-1] + ha_close[i-1]) / 2`
/// - `ha_high = max(high, ha_open, ha_close)`
/// - `ha_low = min(low, ha_open, ha_close)`
///
/// Bucket times are carried over unchanged.
pub fn heikin_ashi(points: &[OhlcPoint]) -> Vec<OhlcPoint> {
    let mut smoothed: Vec<OhlcPoint> = Vec::with_capacity(points.len());

    for point in points {
        let ha_close = (point.open + point.high + point.low + point.close) / 4.0;
        let ha_open = match smoothed.last() {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => (point.open + point.close) / 2.0,
        };

        smoothed.push(OhlcPoint {
            time: point.time,
            open: ha_open,
            high: point.high.max(ha_open).max(ha_close),
            low: point.low.min(ha_open).min(ha_close),
            close: ha_close,
        });
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, open: f64, high: f64, low: f64, close: f64) -> OhlcPoint {
        OhlcPoint {
            time,
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_empty_series() {
        assert!(heikin_ashi(&[]).is_empty());
    }

    #[test]
    fn test_first_candle_uses_own_open_close() {
        let smoothed = heikin_ashi(&[candle(0, 10.0, 14.0, 8.0, 12.0)]);
        assert_eq!(smoothed, vec![candle(0, 11.0, 14.0, 8.0, 11.0)]);
    }

    #[test]
    fn test_following_candles_chain_previous_values() {
        let smoothed = heikin_ashi(&[
            candle(0, 10.0, 14.0, 8.0, 12.0),
            candle(60, 12.0, 13.0, 11.0, 12.0),
        ]);

        // ha_open = (11 + 11) / 2, ha_close = (12 + 13 + 11 + 12) / 4
        assert_eq!(smoothed[1], candle(60, 11.0, 13.0, 11.0, 12.0));
    }

    #[test]
    fn test_high_and_low_envelope_smoothed_body() {
        // A gap down makes ha_open sit above the raw high
        let smoothed = heikin_ashi(&[
            candle(0, 20.0, 20.0, 20.0, 20.0),
            candle(60, 10.0, 10.0, 10.0, 10.0),
        ]);

        assert_eq!(smoothed[1].open, 20.0);
        assert_eq!(smoothed[1].high, 20.0);
        assert_eq!(smoothed[1].low, 10.0);
        assert_eq!(smoothed[1].close, 10.0);
        for point in &smoothed {
            assert!(point.low <= point.open.min(point.close));
            assert!(point.high >= point.open.max(point.close));
        }
    }
}
