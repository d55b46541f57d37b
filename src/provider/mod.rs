//! Upstream price-history providers.
//!
//! A provider turns a symbol into a [`PriceSeries`] of daily bars, or
//! reports that it has none.  "No data" is `Ok(None)`, never an error:
//! [`ProviderError`] is reserved for transport and protocol failures.

pub mod alpha_vantage;
pub mod throttle;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::market_data::{Bar, PriceSeries};

pub use alpha_vantage::AlphaVantageClient;
pub use throttle::{FixedDelayThrottle, Throttle};

/// Top-level key holding the daily series in a provider payload.
pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Keys the provider uses to explain an empty answer (bad symbol, quota).
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Payload(String),
}

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch the full daily history for `symbol`.
    async fn fetch_daily(&self, symbol: &str) -> Result<Option<PriceSeries>, ProviderError>;
}

/// Map a daily-series payload onto a [`PriceSeries`].
///
/// Returns `None` when the payload has no daily series (unknown symbol,
/// quota notice, unrecognised shape) or the series holds no bars.
/// Unparseable numbers become NaN and flow downstream; unparseable dates
/// are skipped.
pub fn parse_daily_payload(symbol: &str, payload: &Value) -> Option<PriceSeries> {
    let Some(days) = payload.get(DAILY_SERIES_KEY).and_then(Value::as_object) else {
        for key in NOTICE_KEYS {
            if let Some(notice) = payload.get(key).and_then(Value::as_str) {
                warn!(symbol, notice, "provider returned no daily series");
                return None;
            }
        }
        warn!(symbol, "payload has no daily series");
        return None;
    };

    let mut bars = Vec::with_capacity(days.len());
    for (date, fields) in days {
        let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            warn!(symbol, date = %date, "skipping bar with unparseable date");
            continue;
        };
        let volume = field_f64(fields, "6. volume")
            .or_else(|| field_f64(fields, "5. volume"))
            .unwrap_or(f64::NAN);
        bars.push(Bar {
            adjusted_close: field_f64(fields, "5. adjusted close"),
            ..Bar::new(
                date,
                field_f64(fields, "1. open").unwrap_or(f64::NAN),
                field_f64(fields, "2. high").unwrap_or(f64::NAN),
                field_f64(fields, "3. low").unwrap_or(f64::NAN),
                field_f64(fields, "4. close").unwrap_or(f64::NAN),
                volume,
            )
        });
    }

    if bars.is_empty() {
        return None;
    }
    Some(PriceSeries::new(symbol, bars))
}

/// Read a field that may be either a numeric string or a number.  A
/// present-but-garbled value reads as NaN; an absent one as `None`.
fn field_f64(fields: &Value, key: &str) -> Option<f64> {
    let val = fields.get(key)?;
    if let Some(s) = val.as_str() {
        Some(s.trim().parse::<f64>().unwrap_or(f64::NAN))
    } else if let Some(n) = val.as_f64() {
        Some(n)
    } else {
        Some(f64::NAN)
    }
}
