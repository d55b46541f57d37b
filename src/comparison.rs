// =============================================================================
// Comparison Normalizer - base-100 multi-symbol view
// =============================================================================
//
// Per symbol, independently:
//   1. Keep the most recent 365 *bars* (a bar-count tail, unlike the Indicator
//      Engine's calendar-day window).
//   2. Compute MA30, MA90 and the running VWAP over those bars.
//   3. Keep rows where every field of `ComparisonIndicatorPolicy` is defined.
//   4. Rescale close / MA30 / MA90 / VWAP so the first kept close is 100.
//
// A symbol that fails only produces an inline error for itself.
// =============================================================================

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::engine::{MA_LONG_PERIOD, MA_SHORT_PERIOD};
use crate::indicators::{
    calculate_sma, calculate_vwap, defined, retained_rows, ComparisonIndicatorPolicy, FieldSource,
    RequiredField,
};
use crate::market_data::PriceSeries;
use crate::types::{AnalysisError, Outcome};

/// Number of most recent bars each symbol is reduced to.
pub const COMPARISON_BARS: usize = 365;
/// Value every normalized series starts from.
pub const NORMALIZED_BASE: f64 = 100.0;

/// Normalized series for one symbol, aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonFrame {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub ma30: Vec<f64>,
    pub ma90: Vec<f64>,
    pub vwap: Vec<f64>,
}

struct ComparisonColumns {
    closes: Vec<f64>,
    ma30: Vec<Option<f64>>,
    ma90: Vec<Option<f64>>,
    vwap: Vec<Option<f64>>,
}

impl FieldSource for ComparisonColumns {
    fn row_count(&self) -> usize {
        self.closes.len()
    }

    fn field(&self, field: RequiredField, row: usize) -> Option<f64> {
        match field {
            RequiredField::Close => defined(self.closes[row]),
            RequiredField::Ma30 => self.ma30[row],
            RequiredField::Ma90 => self.ma90[row],
            RequiredField::Vwap => self.vwap[row],
            // Not computed for the comparison view.
            _ => None,
        }
    }
}

/// Normalize one symbol's series to base 100.
///
/// An empty series is [`AnalysisError::NoComparisonData`].  A series too
/// short to define MA90 yields an empty frame.
pub fn normalize(series: &PriceSeries) -> Result<ComparisonFrame, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::NoComparisonData(series.symbol().to_string()));
    }

    let recent = series.tail(COMPARISON_BARS);
    let closes = recent.closes();
    let columns = ComparisonColumns {
        ma30: calculate_sma(&closes, MA_SHORT_PERIOD),
        ma90: calculate_sma(&closes, MA_LONG_PERIOD),
        vwap: calculate_vwap(recent.bars()),
        closes,
    };
    let rows = retained_rows(&ComparisonIndicatorPolicy, &columns);
    let dates = recent.dates();

    let Some(&first) = rows.first() else {
        return Ok(ComparisonFrame {
            dates: Vec::new(),
            close: Vec::new(),
            ma30: Vec::new(),
            ma90: Vec::new(),
            vwap: Vec::new(),
        });
    };
    let base = columns.closes[first];
    let scale = |v: f64| v / base * NORMALIZED_BASE;
    let pick = |column: &[Option<f64>]| -> Vec<f64> {
        rows.iter().filter_map(|&i| column[i]).map(scale).collect()
    };

    Ok(ComparisonFrame {
        dates: rows.iter().map(|&i| dates[i]).collect(),
        close: rows.iter().map(|&i| scale(columns.closes[i])).collect(),
        ma30: pick(&columns.ma30),
        ma90: pick(&columns.ma90),
        vwap: pick(&columns.vwap),
    })
}

// ---------------------------------------------------------------------------
// Batch result
// ---------------------------------------------------------------------------

/// Symbol → frame-or-error, kept in request order and serialised as a JSON
/// object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    entries: IndexMap<String, Outcome<ComparisonFrame>>,
}

impl ComparisonResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `symbol`.  A replaced entry keeps its
    /// original position.
    pub fn insert(&mut self, symbol: impl Into<String>, outcome: Outcome<ComparisonFrame>) {
        self.entries.insert(symbol.into(), outcome);
    }
}

#[cfg(test)]
impl ComparisonResult {
    pub fn get(&self, symbol: &str) -> Option<&Outcome<ComparisonFrame>> {
        self.entries.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize every symbol independently.  Symbols whose data could not be
/// obtained arrive as `Err` and are passed through as inline errors.
pub fn compare<I>(series_by_symbol: I) -> ComparisonResult
where
    I: IntoIterator<Item = (String, Result<PriceSeries, AnalysisError>)>,
{
    let mut result = ComparisonResult::new();
    for (symbol, data) in series_by_symbol {
        let outcome = data.and_then(|series| normalize(&series)).into();
        result.insert(symbol, outcome);
    }
    result
}
