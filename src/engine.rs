// =============================================================================
// Indicator Engine - single-symbol trend / momentum / volatility / volume view
// =============================================================================
//
// Pipeline:
//   1. Window the series to the trailing `window_days` calendar days.
//   2. Compute every indicator over the windowed bars (columns stay aligned).
//   3. Keep only rows where every field of `FullIndicatorPolicy` is defined.
//   4. Summarise high / low / last close over the kept rows.
//
// The 90-bar MA dominates the warm-up, so the first 89 bars of the window
// never survive step 3.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::bollinger::{BOLLINGER_NUM_STD, BOLLINGER_PERIOD};
use crate::indicators::rsi::RSI_PERIOD;
use crate::indicators::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, calculate_vwap, defined,
    retained_rows, FieldSource, FullIndicatorPolicy, RequiredField,
};
use crate::market_data::PriceSeries;
use crate::types::AnalysisError;

/// Trailing calendar window applied before any indicator is computed.
pub const DEFAULT_WINDOW_DAYS: i64 = 365;
pub const MA_SHORT_PERIOD: usize = 30;
pub const MA_LONG_PERIOD: usize = 90;

// ---------------------------------------------------------------------------
// Unfiltered columns
// ---------------------------------------------------------------------------

/// Every indicator aligned 1:1 with the input bars, before row filtering.
#[derive(Debug, Clone, Default)]
pub struct IndicatorColumns {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub ma30: Vec<Option<f64>>,
    pub ma90: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub vwap: Vec<Option<f64>>,
}

impl FieldSource for IndicatorColumns {
    fn row_count(&self) -> usize {
        self.dates.len()
    }

    fn field(&self, field: RequiredField, row: usize) -> Option<f64> {
        match field {
            RequiredField::Close => defined(self.closes[row]),
            RequiredField::Volume => defined(self.volumes[row]),
            RequiredField::Ma30 => self.ma30[row],
            RequiredField::Ma90 => self.ma90[row],
            RequiredField::Rsi => self.rsi[row],
            RequiredField::Macd => self.macd[row],
            RequiredField::MacdSignal => self.macd_signal[row],
            RequiredField::BollingerUpper => self.bb_upper[row],
            RequiredField::BollingerLower => self.bb_lower[row],
            RequiredField::Vwap => self.vwap[row],
        }
    }
}

/// Compute every indicator over the whole of `series`, without windowing or
/// row filtering.
pub fn compute_columns(series: &PriceSeries) -> IndicatorColumns {
    let bars = series.bars();
    let closes = series.closes();
    let macd = calculate_macd(&closes);
    let bands = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_NUM_STD);

    IndicatorColumns {
        dates: series.dates(),
        volumes: series.volumes(),
        highs: bars.iter().map(|b| b.high).collect(),
        lows: bars.iter().map(|b| b.low).collect(),
        ma30: calculate_sma(&closes, MA_SHORT_PERIOD),
        ma90: calculate_sma(&closes, MA_LONG_PERIOD),
        rsi: calculate_rsi(&closes, RSI_PERIOD),
        macd: macd.line,
        macd_signal: macd.signal,
        bb_middle: bands.middle,
        bb_upper: bands.upper,
        bb_lower: bands.lower,
        vwap: calculate_vwap(bars),
        closes,
    }
}

// ---------------------------------------------------------------------------
// Filtered frame
// ---------------------------------------------------------------------------

/// The single-symbol result handed to the presentation layer.  Sequences are
/// aligned by index; every value in them is defined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
    pub ma30: Vec<f64>,
    pub ma90: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub vwap: Vec<f64>,
    /// Highest high over the retained rows; `None` when no row survives.
    pub high: Option<f64>,
    /// Lowest low over the retained rows; `None` when no row survives.
    pub low: Option<f64>,
    pub last_close: Option<f64>,
}

#[cfg(test)]
impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Run the full single-symbol pipeline.
///
/// An empty series is reported as [`AnalysisError::NoData`].  Too little
/// history is not an error: the frame just comes back empty.
pub fn compute(series: &PriceSeries, window_days: i64) -> Result<IndicatorFrame, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::NoData(series.symbol().to_string()));
    }

    let window = series.last_calendar_days(window_days);
    let columns = compute_columns(&window);
    let rows = retained_rows(&FullIndicatorPolicy, &columns);

    Ok(frame_from_rows(series.symbol(), &columns, &rows))
}

fn frame_from_rows(symbol: &str, columns: &IndicatorColumns, rows: &[usize]) -> IndicatorFrame {
    // Only called with rows the policy has already vetted.
    let pick = |column: &[Option<f64>]| -> Vec<f64> {
        rows.iter().filter_map(|&i| column[i]).collect()
    };
    let pick_raw = |column: &[f64]| -> Vec<f64> { rows.iter().map(|&i| column[i]).collect() };

    let high = rows
        .iter()
        .map(|&i| columns.highs[i])
        .filter(|v| !v.is_nan())
        .reduce(f64::max);
    let low = rows
        .iter()
        .map(|&i| columns.lows[i])
        .filter(|v| !v.is_nan())
        .reduce(f64::min);
    let last_close = rows.last().map(|&i| columns.closes[i]);

    IndicatorFrame {
        symbol: symbol.to_string(),
        dates: rows.iter().map(|&i| columns.dates[i]).collect(),
        closes: pick_raw(&columns.closes),
        volumes: pick_raw(&columns.volumes),
        ma30: pick(&columns.ma30),
        ma90: pick(&columns.ma90),
        rsi: pick(&columns.rsi),
        macd: pick(&columns.macd),
        macd_signal: pick(&columns.macd_signal),
        bb_upper: pick(&columns.bb_upper),
        bb_lower: pick(&columns.bb_lower),
        vwap: pick(&columns.vwap),
        high,
        low,
        last_close,
    }
}
