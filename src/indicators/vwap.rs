// =============================================================================
// Volume-Weighted Average Price (VWAP) - anchored at the first bar
// =============================================================================
//
//   typical_t = (high_t + low_t + close_t) / 3
//   VWAP_t    = Σ_{i<=t} typical_i * volume_i  /  Σ_{i<=t} volume_i
//
// The sums run from the first bar of whatever slice is passed in, so the
// caller's windowing decides the anchor.  This is not a rolling window.

use super::defined;
use crate::market_data::Bar;

/// Running VWAP since the first bar of `bars`.
///
/// # Edge cases
/// - Each running sum skips NaN terms on its own.  A bar with a NaN price
///   but a finite volume is `None` on that row, adds nothing to cumulative
///   turnover, and still adds its volume to cumulative volume.
/// - A bar with a NaN volume is `None` and adds to neither sum.
/// - Zero cumulative volume gives 0 / 0 => `None`.
pub fn calculate_vwap(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(bars.len());
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    for bar in bars {
        if !bar.volume.is_nan() {
            cumulative_volume += bar.volume;
        }
        let tpv = bar.typical_price() * bar.volume;
        if tpv.is_nan() {
            result.push(None);
            continue;
        }
        cumulative_tpv += tpv;
        result.push(defined(cumulative_tpv / cumulative_volume));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar(offset: i64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(offset);
        Bar::new(date, close, high, low, close, volume)
    }

    #[test]
    fn vwap_constant_typical_price() {
        let bars: Vec<Bar> = (0..50).map(|i| bar(i, 11.0, 9.0, 10.0, 1_000.0)).collect();
        for v in calculate_vwap(&bars) {
            assert!((v.unwrap() - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn vwap_weights_by_volume() {
        let bars = vec![bar(0, 10.0, 10.0, 10.0, 1.0), bar(1, 20.0, 20.0, 20.0, 3.0)];
        let vwap = calculate_vwap(&bars);
        assert_eq!(vwap[0], Some(10.0));
        assert!((vwap[1].unwrap() - 17.5).abs() < 1e-12);
    }

    #[test]
    fn vwap_zero_volume_start_is_missing() {
        let bars = vec![bar(0, 10.0, 10.0, 10.0, 0.0), bar(1, 20.0, 20.0, 20.0, 2.0)];
        let vwap = calculate_vwap(&bars);
        assert!(vwap[0].is_none());
        assert_eq!(vwap[1], Some(20.0));
    }

    #[test]
    fn vwap_nan_price_keeps_its_volume() {
        let bars = vec![
            bar(0, 10.0, 10.0, 10.0, 1.0),
            bar(1, f64::NAN, 10.0, 10.0, 1.0),
            bar(2, 30.0, 30.0, 30.0, 1.0),
        ];
        let vwap = calculate_vwap(&bars);
        assert_eq!(vwap[0], Some(10.0));
        assert!(vwap[1].is_none());
        assert!((vwap[2].unwrap() - 40.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn vwap_nan_volume_adds_to_neither_sum() {
        let bars = vec![
            bar(0, 10.0, 10.0, 10.0, 1.0),
            bar(1, 50.0, 50.0, 50.0, f64::NAN),
            bar(2, 30.0, 30.0, 30.0, 1.0),
        ];
        let vwap = calculate_vwap(&bars);
        assert!(vwap[1].is_none());
        assert_eq!(vwap[2], Some(20.0));
    }
}
