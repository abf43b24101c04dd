//! Earnings Calendar Port (Driven Port)

use async_trait::async_trait;
use chrono::NaiveDate;

use super::chain_data::MarketDataError;

/// Sentinel date meaning "no earnings date known" (no near-term earnings
/// risk).
#[must_use]
pub fn far_future_earnings() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Port for fetching the next earnings date of an underlying.
#[async_trait]
pub trait EarningsPort: Send + Sync {
    /// Next earnings date at or after yesterday.
    ///
    /// Implementations return [`far_future_earnings`] when no upcoming
    /// earnings date is known.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] on transport failure.
    async fn fetch_next_earnings_date(
        &self,
        underlying: &str,
    ) -> Result<NaiveDate, MarketDataError>;
}
