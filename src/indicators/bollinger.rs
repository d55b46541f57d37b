// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the *sample* standard deviation
// (ddof = 1) of the same trailing window.

use super::{calculate_sma, defined};

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// Aligned band series.  All three share the same warm-up.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands for every row of `closes`.
///
/// Rows before index `period - 1` are `None`.  A flat window has σ = 0 and
/// collapses all three bands onto the middle band.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let middle = calculate_sma(closes, period);
    let std_dev = rolling_sample_std(closes, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    for (m, s) in middle.iter().zip(std_dev.iter()) {
        match (m, s) {
            (Some(m), Some(s)) => {
                upper.push(defined(m + num_std * s));
                lower.push(defined(m - num_std * s));
            }
            _ => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

/// Trailing sample standard deviation.  Needs `period >= 2`.
fn rolling_sample_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period < 2 || values.len() < period {
        return result;
    }

    for (i, window) in values.windows(period).enumerate() {
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        result[i + period - 1] = defined(variance.sqrt());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        let (upper, middle, lower) = (bb.upper[19].unwrap(), bb.middle[19].unwrap(), bb.lower[19].unwrap());
        assert!((middle - 10.5).abs() < 1e-10);
        assert!(upper > middle);
        assert!(lower < middle);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_uses_sample_std() {
        // Sample std of [1, 2, 3] is 1.0 (population std would be ~0.816).
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], 3, 2.0);
        assert!((bb.upper[2].unwrap() - 4.0).abs() < 1e-12);
        assert!((bb.lower[2].unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn bollinger_warm_up() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        assert!(bb.upper[..19].iter().all(Option::is_none));
        assert!(bb.upper[19..].iter().all(Option::is_some));
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], 20, 2.0);
        assert!(bb.upper.iter().all(Option::is_none));
        assert!(bb.middle.iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_flat() {
        let bb = calculate_bollinger(&vec![100.0; 20], 20, 2.0);
        assert_eq!(bb.upper[19], Some(100.0));
        assert_eq!(bb.middle[19], Some(100.0));
        assert_eq!(bb.lower[19], Some(100.0));
    }
}
