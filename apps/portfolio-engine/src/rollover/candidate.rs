//! Rollover candidate record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{OptionRight, OptionSymbol};

/// A replacement contract surviving all rollover filters.
///
/// Produced transiently per search attempt; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloverCandidate {
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
    /// Mid price.
    pub mid_price: Decimal,
    /// Bid-ask spread as a percentage of mid.
    pub bid_ask_spread_pct: f64,
    /// Mid price minus the current option's price; negative is a debit.
    pub net_credit: Decimal,
    /// Extrinsic value.
    pub extrinsic: Decimal,
    /// Extrinsic value per day of remaining life.
    pub extrinsic_per_day: f64,
    /// Theta.
    pub theta: f64,
    /// Delta.
    pub delta: f64,
    /// Implied volatility.
    pub implied_vol: f64,
    /// Open interest.
    pub open_interest: i64,
    /// Annualized return of the extrinsic decay rate against strike,
    /// percent (informational, not part of the score).
    pub apr: f64,
    /// Composite quality score, 0-100.
    pub quality_score: f64,
    /// Days gained over the current option.
    pub days_gained: i64,
    /// Distance from spot, percent; negative = out-of-the-money (safer).
    pub distance_pct: f64,
    /// Intrinsic value (always zero for surviving candidates).
    pub intrinsic: Decimal,
}

impl RolloverCandidate {
    /// Canonical symbol of the recommended contract.
    #[must_use]
    pub fn unified_symbol(&self, underlying: &str, right: OptionRight) -> OptionSymbol {
        OptionSymbol::new(underlying, self.expiration, right, self.strike)
    }
}
