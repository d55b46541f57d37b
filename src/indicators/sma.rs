// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Undefined until `period` values have accumulated, and undefined for any
// window that contains a missing value.

use super::defined;

/// Trailing mean over `period` values, aligned with `values`.
///
/// # Edge cases
/// - `period == 0` => every row is `None`
/// - the first `period - 1` rows are `None`
/// - a NaN anywhere in the window makes that row `None`
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for (i, window) in values.windows(period).enumerate() {
        let sum: f64 = window.iter().sum();
        result[i + period - 1] = defined(sum / period as f64);
    }
    result
}
