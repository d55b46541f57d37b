// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator primitives.  Every series-valued function
// returns a `Vec<Option<f64>>` aligned 1:1 with its input, where `None` marks
// a row the indicator cannot define (warm-up, missing input, or a NaN produced
// by the arithmetic).  Callers pick the rows they want through a
// `policy::RowFilterPolicy`.

pub mod bollinger;
pub mod ema;
pub mod policy;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_macd;
pub use policy::{
    retained_rows, ComparisonIndicatorPolicy, FieldSource, FullIndicatorPolicy, RequiredField,
};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use vwap::calculate_vwap;

/// Map a raw float onto the aligned-series convention: finite values are
/// defined, NaN and infinities are missing.
pub fn defined(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
