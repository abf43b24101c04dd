//! Market data provider configuration.

use serde::{Deserialize, Serialize};

/// Market data configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Finnhub API key for the earnings calendar, usually injected from
    /// `FINNHUB_API_KEY`.
    #[serde(default)]
    pub finnhub_api_key: String,
}
