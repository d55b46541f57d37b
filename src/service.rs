// =============================================================================
// Analysis Service - request-scoped orchestration
// =============================================================================
//
// Glue between the provider and the pure pipeline:
//   - every provider fetch first acquires a slot from the shared throttle,
//     then runs under a request-level timeout;
//   - multi-symbol comparisons fetch strictly one symbol at a time;
//   - all failures come back as data (`Outcome` / `ComparisonResult`).
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::comparison::{compare, ComparisonResult};
use crate::engine::{self, IndicatorFrame, DEFAULT_WINDOW_DAYS};
use crate::market_data::PriceSeries;
use crate::provider::{PriceHistoryProvider, ProviderError, Throttle};
use crate::types::{AnalysisError, Outcome};

#[derive(Clone)]
pub struct AnalysisService {
    provider: Arc<dyn PriceHistoryProvider>,
    throttle: Arc<dyn Throttle>,
    request_timeout: Duration,
}

impl AnalysisService {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        throttle: Arc<dyn Throttle>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            throttle,
            request_timeout,
        }
    }

    /// One throttled provider fetch, bounded by the request timeout.  Time
    /// spent queueing for a throttle slot does not count against the timeout.
    async fn fetch(&self, symbol: &str) -> Result<Option<PriceSeries>, ProviderError> {
        self.throttle.acquire().await;
        match tokio::time::timeout(self.request_timeout, self.provider.fetch_daily(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.request_timeout)),
        }
    }

    /// Single-symbol indicator view.
    #[instrument(skip(self), name = "service::indicators")]
    pub async fn indicators(&self, symbol: &str) -> Outcome<IndicatorFrame> {
        let result = match self.fetch(symbol).await {
            Ok(Some(series)) => engine::compute(&series, DEFAULT_WINDOW_DAYS),
            Ok(None) => Err(AnalysisError::NoData(symbol.to_string())),
            Err(e) => {
                warn!(symbol, error = %e, "provider fetch failed");
                Err(AnalysisError::Fetch {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        match &result {
            Ok(frame) => info!(symbol, rows = frame.dates.len(), "indicators computed"),
            Err(e) => info!(symbol, error = %e, "indicators unavailable"),
        }
        result.into()
    }

    /// Normalized comparison across `symbols`, fetched sequentially.
    #[instrument(skip(self), name = "service::comparison")]
    pub async fn comparison(&self, symbols: &[String]) -> ComparisonResult {
        let mut fetched = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let data = match self.fetch(symbol).await {
                Ok(Some(series)) => {
                    debug!(symbol = %symbol, bars = series.len(), "series fetched");
                    Ok(series)
                }
                Ok(None) => Err(AnalysisError::NoComparisonData(symbol.clone())),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "provider fetch failed");
                    Err(AnalysisError::Fetch {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    })
                }
            };
            fetched.push((symbol.clone(), data));
        }

        let result = compare(fetched);
        info!(symbols = symbols.len(), "comparison computed");
        result
    }
}

/// Split a comma-separated symbol list: trimmed, upper-cased, blanks
/// removed, duplicates dropped (first occurrence wins).
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
