// =============================================================================
// Exponential Moving Average (EMA) and MACD
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = value_0
//   EMA_t  = alpha * value_t + (1 - alpha) * EMA_{t-1}
//
// The series is seeded directly from its first defined value; there is no
// SMA seed and therefore no warm-up gap.
//
// MACD        = EMA(12) - EMA(26)
// MACD signal = EMA(9) of the MACD series, same recurrence and seeding.
// =============================================================================

use super::defined;

pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;

/// Compute the EMA series for `values` with the given `span`.
///
/// The output is aligned with the input.  Rows before the first defined
/// value are `None`.
///
/// # Edge cases
/// - `span == 0` => every row is `None`
/// - A missing value in the middle carries the previous EMA forward; the
///   next defined value is blended with the decay accumulated over the gap.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let defined_values: Vec<Option<f64>> = values.iter().map(|&v| defined(v)).collect();
    ema_of(&defined_values, span)
}

/// EMA over a series that may already contain missing rows.
pub fn ema_of(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut result = Vec::with_capacity(values.len());
    let mut weighted: Option<f64> = None;
    // Weight of the running average relative to the next observation.
    let mut old_weight = 1.0;

    for value in values {
        match (weighted, *value) {
            (None, Some(v)) => {
                weighted = Some(v);
                old_weight = 1.0;
            }
            (Some(prev), observation) => {
                old_weight *= decay;
                if let Some(v) = observation {
                    // Identical values short-circuit so flat inputs stay exact.
                    if prev != v {
                        weighted = Some((old_weight * prev + alpha * v) / (old_weight + alpha));
                    }
                    old_weight = 1.0;
                }
            }
            (None, None) => {}
        }
        result.push(weighted.and_then(defined));
    }

    result
}

/// MACD line and its signal line, both aligned with the input closes.
#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// Compute MACD(12, 26) and its 9-span signal line from `closes`.
pub fn calculate_macd(closes: &[f64]) -> Macd {
    let fast = calculate_ema(closes, MACD_FAST_SPAN);
    let slow = calculate_ema(closes, MACD_SLOW_SPAN);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => defined(f - s),
            _ => None,
        })
        .collect();
    let signal = ema_of(&line, MACD_SIGNAL_SPAN);

    Macd { line, signal }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a simple ascending price series.
    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_span_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn ema_is_seeded_from_first_value() {
        let ema = calculate_ema(&[10.0, 20.0], 3);
        // alpha = 0.5
        assert_eq!(ema[0], Some(10.0));
        assert!((ema[1].unwrap() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn ema_known_values() {
        let closes = ascending(10);
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);

        let alpha = 2.0 / 6.0;
        let mut expected = closes[0];
        for (i, &c) in closes.iter().enumerate() {
            if i > 0 {
                expected = alpha * c + (1.0 - alpha) * expected;
            }
            let got = ema[i].unwrap();
            assert!((got - expected).abs() < 1e-10, "row {i}: got {got}, expected {expected}");
        }
    }

    #[test]
    fn ema_flat_series_stays_exact() {
        let ema = calculate_ema(&vec![100.0; 50], 26);
        assert!(ema.iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn ema_leading_nan_delays_seed() {
        let ema = calculate_ema(&[f64::NAN, 4.0, 4.0], 3);
        assert!(ema[0].is_none());
        assert_eq!(ema[1], Some(4.0));
    }

    #[test]
    fn ema_gap_carries_previous_value() {
        let ema = calculate_ema(&[2.0, f64::NAN, 8.0], 3);
        assert_eq!(ema[1], Some(2.0));
        // old weight decays twice over the gap: 0.25
        let expected = (0.25 * 2.0 + 0.5 * 8.0) / 0.75;
        assert!((ema[2].unwrap() - expected).abs() < 1e-12);
    }

    // ---- calculate_macd --------------------------------------------------

    #[test]
    fn macd_flat_series_is_zero() {
        let macd = calculate_macd(&vec![100.0; 60]);
        assert!(macd.line.iter().all(|v| *v == Some(0.0)));
        assert!(macd.signal.iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let macd = calculate_macd(&ascending(200));
        assert_eq!(macd.line[0], Some(0.0));
        for v in &macd.line[1..] {
            assert!(v.unwrap() > 0.0);
        }
        // The signal line lags the MACD line while momentum builds.
        assert!(macd.signal[5].unwrap() < macd.line[5].unwrap());
    }

    #[test]
    fn macd_negative_in_downtrend() {
        let closes: Vec<f64> = (1..=200).rev().map(|x| x as f64).collect();
        let macd = calculate_macd(&closes);
        assert!(macd.line[199].unwrap() < 0.0);
    }
}
