use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One trading day of OHLCV data.
///
/// The usual bar invariants (`high >= low`, `high >= max(open, close)`) are
/// expected but never enforced: malformed upstream data is carried as-is and
/// surfaces as missing indicator values further down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Only some provider endpoints report a split/dividend-adjusted close.
    #[serde(default)]
    pub adjusted_close: Option<f64>,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adjusted_close: None,
            volume,
        }
    }

    /// `(high + low + close) / 3`, the price VWAP weights by volume.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- immutable, date-ordered bars for a single symbol
// ---------------------------------------------------------------------------

/// Daily bars for one symbol, sorted ascending by date with no duplicate
/// dates.  Built fresh per request and never mutated afterwards; windowing
/// operations return new series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars in any order.  Bars are sorted by date and,
    /// when a date repeats, the first occurrence wins.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps the first occurrence ahead of later duplicates.
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Keep only bars dated strictly after `last_date - days`.
    ///
    /// This is a calendar cutoff, not a bar count: weekends, holidays and
    /// gaps in the data all reduce the number of bars retained.
    pub fn last_calendar_days(&self, days: i64) -> Self {
        let Some(last) = self.last_date() else {
            return self.clone();
        };
        let cutoff = last - Duration::days(days);
        let start = self.bars.partition_point(|b| b.date <= cutoff);
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    /// Keep the most recent `count` bars.
    pub fn tail(&self, count: usize) -> Self {
        let start = self.bars.len().saturating_sub(count);
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn bar(offset: i64, close: f64) -> Bar {
        Bar::new(day(offset), close, close, close, close, 1.0)
    }

    #[test]
    fn new_sorts_and_drops_duplicate_dates() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar(2, 3.0), bar(0, 1.0), bar(2, 99.0), bar(1, 2.0)],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.symbol(), "AAPL");
    }

    #[test]
    fn calendar_window_excludes_the_cutoff_date() {
        let bars = (0..=10).map(|i| bar(i, i as f64)).collect();
        let series = PriceSeries::new("X", bars);
        // last = day 10, cutoff = day 5; day 5 itself is dropped.
        let window = series.last_calendar_days(5);
        assert_eq!(window.dates().first().copied(), Some(day(6)));
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn calendar_window_on_sparse_data_keeps_fewer_bars() {
        // One bar per week over ~two years.
        let bars = (0..104).map(|i| bar(i * 7, i as f64)).collect();
        let series = PriceSeries::new("X", bars);
        let window = series.last_calendar_days(365);
        assert!(window.len() <= 53);
        assert!(window.len() < 365);
    }

    #[test]
    fn tail_keeps_most_recent_bars() {
        let bars = (0..10).map(|i| bar(i, i as f64)).collect();
        let series = PriceSeries::new("X", bars);
        assert_eq!(series.tail(3).closes(), vec![7.0, 8.0, 9.0]);
        assert_eq!(series.tail(50).len(), 10);
    }

    #[test]
    fn windowing_empty_series_is_empty() {
        let series = PriceSeries::new("X", Vec::new());
        assert!(series.last_calendar_days(365).is_empty());
        assert!(series.tail(365).is_empty());
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let b = Bar::new(day(0), 0.0, 12.0, 6.0, 9.0, 1.0);
        assert!((b.typical_price() - 9.0).abs() < 1e-12);
    }
}
