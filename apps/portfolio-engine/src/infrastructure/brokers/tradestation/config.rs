//! TradeStation adapter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::brokers::http_client::RetryConfig;

/// TradeStation API configuration.
///
/// The access token is a pre-obtained session credential; the adapter
/// never refreshes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStationConfig {
    /// Whether this source participates in the run.
    #[serde(default)]
    pub enabled: bool,
    /// OAuth access token, usually injected from
    /// `TRADESTATION_ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: String,
    /// Brokerage account ID.
    #[serde(default)]
    pub account_id: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout, seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry behavior.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    "https://api.tradestation.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TradeStationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_token: String::new(),
            account_id: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl TradeStationConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
