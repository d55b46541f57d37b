// =============================================================================
// Alpha Vantage REST Client - daily adjusted time series
// =============================================================================
//
// SECURITY: The API key travels as a query parameter (the provider offers no
// header alternative) and is never logged or serialised.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{parse_daily_payload, PriceHistoryProvider, ProviderError};
use crate::config::AppConfig;
use crate::market_data::PriceSeries;

const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY_ADJUSTED";

/// Alpha Vantage client.  One instance is shared by every request.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    output_size: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    /// Build a client from the provider section of the application config.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.base_url, "AlphaVantageClient initialised");

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            output_size: config.output_size.clone(),
            client,
        })
    }

    /// GET /query?function=TIME_SERIES_DAILY_ADJUSTED - raw JSON payload.
    #[instrument(skip(self), name = "alpha_vantage::daily_payload")]
    pub async fn daily_payload(&self, symbol: &str) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/query", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("function", DAILY_FUNCTION),
                ("symbol", symbol),
                ("outputsize", self.output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        debug!(symbol, "daily payload retrieved");
        Ok(body)
    }
}

#[async_trait]
impl PriceHistoryProvider for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<Option<PriceSeries>, ProviderError> {
        let payload = self.daily_payload(symbol).await?;
        let series = parse_daily_payload(symbol, &payload);
        debug!(
            symbol,
            bars = series.as_ref().map(PriceSeries::len).unwrap_or(0),
            "daily series parsed"
        );
        Ok(series)
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("output_size", &self.output_size)
            .finish()
    }
}
