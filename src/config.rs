// =============================================================================
// Application Configuration - provider credentials, pacing, HTTP binding
// =============================================================================
//
// Loaded once at start-up from a JSON file, then overlaid with environment
// variables.  All fields carry `#[serde(default)]` so that a partial (or
// empty) file still loads.  The indicator pipeline itself takes no
// configuration; everything here belongs to the provider and HTTP layers.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "tickerscope.json";

pub const ENV_CONFIG_PATH: &str = "TICKERSCOPE_CONFIG";
pub const ENV_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const ENV_BIND_ADDR: &str = "TICKERSCOPE_BIND_ADDR";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_output_size() -> String {
    "full".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// 5 requests per minute on the free tier.
fn default_inter_request_delay_ms() -> u64 {
    15_000
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_symbol() -> String {
    "AAPL".to_string()
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // --- Provider -----------------------------------------------------------

    /// Provider API key.  Usually supplied through `ALPHA_VANTAGE_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `full` (20+ years) or `compact` (latest 100 bars).
    #[serde(default = "default_output_size")]
    pub output_size: String,

    /// Upper bound on a single provider fetch, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between successive fetches of a multi-symbol comparison.
    #[serde(default = "default_inter_request_delay_ms")]
    pub inter_request_delay_ms: u64,

    // --- HTTP ---------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Symbol used by `/data` when the query omits one.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            output_size: default_output_size(),
            request_timeout_secs: default_request_timeout_secs(),
            inter_request_delay_ms: default_inter_request_delay_ms(),
            bind_addr: default_bind_addr(),
            default_symbol: default_symbol(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            base_url = %config.base_url,
            "config loaded"
        );

        Ok(config)
    }

    /// Overlay values from environment variables, looked up through `lookup`
    /// so that tests need not touch the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("output_size", &self.output_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("bind_addr", &self.bind_addr)
            .field("default_symbol", &self.default_symbol)
            .finish()
    }
}
