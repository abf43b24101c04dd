//! Chain Data Port (Driven Port)
//!
//! Interface for fetching option chain snapshots from a market data
//! provider. Used by enrichment (exact contract lookup) and by the rollover
//! engine (full later-dated chain scan).

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OptionRight, OptionSymbol};

/// One contract row in a chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainContract {
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Days to expiration.
    pub days_to_expiration: i64,
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
    /// Delta.
    pub delta: f64,
    /// Gamma.
    pub gamma: f64,
    /// Theta.
    pub theta: f64,
    /// Vega.
    pub vega: f64,
    /// Implied volatility.
    pub implied_vol: f64,
    /// Open interest.
    pub open_interest: i64,
    /// Whether the provider marks the contract in-the-money.
    pub in_the_money: bool,
}

impl ChainContract {
    /// Mid price, `(bid + ask) / 2`.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// Option chain snapshot for one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying ticker.
    pub underlying: String,
    /// Underlying spot price at snapshot time.
    pub underlying_price: Decimal,
    /// Contract rows, in provider order.
    pub contracts: Vec<ChainContract>,
}

/// Market data transport errors.
#[derive(Debug, Clone, Error)]
pub enum MarketDataError {
    /// API returned a non-2xx response.
    #[error("market data API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or message from the API.
        message: String,
    },

    /// Missing or malformed credentials.
    #[error("market data authentication failed")]
    AuthenticationFailed,

    /// Network error (retryable).
    #[error("market data network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("market data JSON parsing error: {0}")]
    JsonParse(String),

    /// Rate limited.
    #[error("market data rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Max retries exceeded.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

/// Port for fetching option chain data.
#[async_trait]
pub trait ChainDataPort: Send + Sync {
    /// Fetch the chain entry for one exact contract
    /// (strike/expiration/right).
    ///
    /// Returns `Ok(None)` when the provider has no data for the contract.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] on transport failure.
    async fn fetch_exact_chain(
        &self,
        symbol: &OptionSymbol,
    ) -> Result<Option<ChainSnapshot>, MarketDataError>;

    /// Fetch the full chain of one right for an underlying across an
    /// expiration window.
    ///
    /// Returns `Ok(None)` when the provider has no data for the window.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] on transport failure.
    async fn fetch_full_chain(
        &self,
        underlying: &str,
        right: OptionRight,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<ChainSnapshot>, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn chain_contract_mid() {
        let contract = ChainContract {
            strike: dec!(110),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            days_to_expiration: 20,
            bid: dec!(1.10),
            ask: dec!(1.20),
            delta: 0.25,
            gamma: 0.02,
            theta: -0.05,
            vega: 0.11,
            implied_vol: 0.35,
            open_interest: 250,
            in_the_money: false,
        };

        assert_eq!(contract.mid(), dec!(1.15));
    }
}
