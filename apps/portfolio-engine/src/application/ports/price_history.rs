//! Price History Port (Driven Port)
//!
//! Interface for fetching daily closing prices, used to compute the
//! underlying's trailing historical volatility.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::chain_data::MarketDataError;

/// One daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    /// Trading day.
    pub date: NaiveDate,
    /// Closing price.
    pub close: Decimal,
}

/// Port for fetching daily close history.
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Fetch daily closes for the trailing `lookback_days` calendar days,
    /// ordered oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] on transport failure.
    async fn fetch_daily_closes(
        &self,
        underlying: &str,
        lookback_days: u32,
    ) -> Result<Vec<DailyClose>, MarketDataError>;
}
