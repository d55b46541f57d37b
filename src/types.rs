// =============================================================================
// Shared types used across the Tickerscope service
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Data-shaped failures.  Every variant is reported to the client as an
/// `{ "error": "..." }` object, never as a transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Single-symbol view: the provider had no series for the symbol.
    #[error("Invalid symbol or no data found for {0}.")]
    NoData(String),

    /// Comparison view: the provider had no series for the symbol.
    #[error("No data found for {0}")]
    NoComparisonData(String),

    /// The provider could not be reached or answered with garbage.
    #[error("Failed to fetch data for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("No valid symbols provided.")]
    NoSymbols,
}

/// `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<AnalysisError> for ErrorBody {
    fn from(e: AnalysisError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Either a computed payload or an inline error, serialised untagged so the
/// client sees the bare payload object or the bare error object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ok(T),
    Err(ErrorBody),
}

#[cfg(test)]
impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(v) => Some(v),
            Self::Err(_) => None,
        }
    }

    pub fn err(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Err(e) => Some(&e.error),
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Outcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Err(e.into()),
        }
    }
}
