// =============================================================================
// Relative Strength Index (RSI) - simple rolling means
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 - Compute day-over-day close deltas.  The first bar has no previous
//          close; its delta counts as zero gain and zero loss.
// Step 2 - gain_t = mean of positive deltas over the trailing `period` bars
//          loss_t = mean of |negative deltas| over the trailing `period` bars
// Step 3 - RS  = gain / loss
//          RSI = 100 - 100 / (1 + RS)
//
// IEEE semantics resolve the degenerate cases: loss == 0 with gains gives
// RS = inf and RSI = 100; a flat window gives 0 / 0 = NaN, which is missing.
// =============================================================================

use super::defined;

pub const RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned with the input.
///
/// The first defined value is at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => every row is `None`
/// - no losses in the window => 100.0
/// - no movement in the window => `None`
/// - a NaN close contributes no gain and no loss
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    // --- Split deltas into gains and losses ---------------------------------
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        // A NaN delta fails both comparisons and counts as no move.
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    // --- Rolling means and RSI -----------------------------------------------
    let period_f = period as f64;
    for i in (period - 1)..closes.len() {
        let start = i + 1 - period;
        let gain = gains[start..=i].iter().sum::<f64>() / period_f;
        let loss = losses[start..=i].iter().sum::<f64>() / period_f;
        result[i] = rsi_from_averages(gain, loss);
    }

    result
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is NaN (a window with no movement).
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rs = avg_gain / avg_loss;
    defined(100.0 - 100.0 / (1.0 + rs))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_defined_at_period_minus_one() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!(series[..13].iter().all(Option::is_none));
        assert!(series[13].is_some());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        // Strictly ascending prices => loss is zero => RS is infinite.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.iter().skip(13) {
            assert_eq!(*v, Some(100.0));
        }
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.iter().skip(13) {
            assert!(v.unwrap().abs() < 1e-10);
        }
    }

    #[test]
    fn rsi_flat_market_is_missing() {
        // 0 / 0 => NaN => missing.
        let series = calculate_rsi(&vec![100.0; 30], 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_known_value() {
        // Deltas: +2, -1 over a 3-bar window including the zero first delta.
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 3);
        // gain = 2/3, loss = 1/3, RS = 2, RSI = 100 - 100/3
        let expected = 100.0 - 100.0 / 3.0;
        assert!((series[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_nan_close_counts_as_no_move() {
        let mut closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        closes[5] = f64::NAN;
        let series = calculate_rsi(&closes, 14);
        for v in series.iter().skip(13) {
            assert_eq!(*v, Some(100.0));
        }
    }
}
