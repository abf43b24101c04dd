//! Option position enrichment.
//!
//! Fetches the exact chain entry for each option position and attaches
//! derived analytics: intrinsic/extrinsic value, moneyness, the
//! action-needed flag, greeks passthrough, days to earnings, and the
//! underlying's trailing historical volatility.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::ports::{
    ChainContract, ChainDataPort, DailyClose, EarningsPort, MarketDataError, PriceHistoryPort,
    far_future_earnings,
};
use crate::domain::{
    InstrumentType, OptionAnalytics, OptionSymbol, Position, SymbolError, intrinsic_value,
};

/// Enrichment thresholds.
///
/// The defaults mirror long-standing operational constants; they are
/// parameters, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Flag ITM positions when DTE is at or below this value.
    #[serde(default = "default_itm_dte_threshold")]
    pub itm_dte_threshold: i64,
    /// Flag positions whose extrinsic value falls to or below
    /// `strike × this ratio` (time value exhausted).
    #[serde(default = "default_extrinsic_floor_ratio")]
    pub extrinsic_floor_ratio: Decimal,
    /// Calendar days of close history used for historical volatility.
    #[serde(default = "default_history_lookback_days")]
    pub history_lookback_days: u32,
}

fn default_itm_dte_threshold() -> i64 {
    5
}

fn default_extrinsic_floor_ratio() -> Decimal {
    Decimal::new(1, 2) // 1% of strike
}

fn default_history_lookback_days() -> u32 {
    365
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            itm_dte_threshold: default_itm_dte_threshold(),
            extrinsic_floor_ratio: default_extrinsic_floor_ratio(),
            history_lookback_days: default_history_lookback_days(),
        }
    }
}

/// Errors that fail enrichment of a single position.
///
/// Never fatal to the run: the caller drops the affected position and
/// continues with the rest of the portfolio.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The position's symbol is not a valid unified option symbol.
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// A market data fetch failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The provider returned no chain entry for the contract.
    #[error("no chain data for {symbol}")]
    NoChainData {
        /// The contract that had no data.
        symbol: String,
    },
}

/// Enrichment service over the chain, history, and earnings ports.
pub struct OptionEnricher {
    chain: Arc<dyn ChainDataPort>,
    history: Arc<dyn PriceHistoryPort>,
    earnings: Arc<dyn EarningsPort>,
    config: EnrichmentConfig,
}

impl OptionEnricher {
    /// Create an enricher.
    #[must_use]
    pub fn new(
        chain: Arc<dyn ChainDataPort>,
        history: Arc<dyn PriceHistoryPort>,
        earnings: Arc<dyn EarningsPort>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            chain,
            history,
            earnings,
            config,
        }
    }

    /// Enrich one position.
    ///
    /// Non-option positions pass through unchanged. Expired options return
    /// `Ok(None)` and are dropped from further processing.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError`] when the symbol cannot be parsed or a
    /// market data fetch fails; the caller treats the position as
    /// unenriched and continues.
    pub async fn enrich(
        &self,
        mut position: Position,
        as_of: NaiveDate,
    ) -> Result<Option<Position>, EnrichmentError> {
        if position.instrument_type != InstrumentType::Option {
            return Ok(Some(position));
        }

        let symbol: OptionSymbol = position.symbol.parse()?;
        if symbol.is_expired(as_of) {
            debug!(symbol = %symbol, "Dropping expired option");
            return Ok(None);
        }

        let snapshot = self
            .chain
            .fetch_exact_chain(&symbol)
            .await?
            .ok_or_else(|| EnrichmentError::NoChainData {
                symbol: symbol.to_string(),
            })?;
        let contract = best_matching_contract(&snapshot.contracts, &symbol).ok_or_else(|| {
            EnrichmentError::NoChainData {
                symbol: symbol.to_string(),
            }
        })?;

        let underlying_price = snapshot.underlying_price;
        let mid = contract.mid().round_dp(2);
        let intrinsic = intrinsic_value(symbol.right(), underlying_price, symbol.strike());
        let extrinsic = mid - intrinsic;
        let in_the_money = contract.in_the_money;
        let days_to_expiration = contract.days_to_expiration;

        let action_needed = self.needs_action(
            in_the_money,
            days_to_expiration,
            extrinsic,
            symbol.strike(),
        );

        let days_to_earnings = self.days_to_earnings(symbol.underlying(), as_of).await;
        let underlying_volatility = self.historical_volatility(symbol.underlying()).await?;
        let x_std = strike_distance_in_vol_units(
            symbol.strike(),
            underlying_price,
            underlying_volatility,
        );

        debug!(
            symbol = %symbol,
            mid = %mid,
            dte = days_to_expiration,
            itm = in_the_money,
            action = action_needed,
            "Enriched option position"
        );

        position.analytics = Some(OptionAnalytics {
            underlying_price,
            mid_price: mid,
            days_to_expiration,
            intrinsic,
            extrinsic,
            in_the_money,
            action_needed,
            days_to_earnings,
            delta: contract.delta,
            gamma: contract.gamma,
            theta: contract.theta,
            vega: contract.vega,
            open_interest: contract.open_interest,
            implied_vol: contract.implied_vol,
            underlying_volatility,
            x_std,
        });
        Ok(Some(position))
    }

    /// Action flag: near-expiry ITM risk, or extrinsic value at or below the
    /// per-strike floor.
    fn needs_action(
        &self,
        in_the_money: bool,
        days_to_expiration: i64,
        extrinsic: Decimal,
        strike: Decimal,
    ) -> bool {
        let near_expiry_itm = in_the_money && days_to_expiration <= self.config.itm_dte_threshold;
        let time_value_exhausted = extrinsic <= strike * self.config.extrinsic_floor_ratio;
        near_expiry_itm || time_value_exhausted
    }

    /// Days until the next earnings date; the far-future sentinel (and thus
    /// a large day count) when the earnings source fails or knows nothing.
    async fn days_to_earnings(&self, underlying: &str, as_of: NaiveDate) -> i64 {
        let date = match self.earnings.fetch_next_earnings_date(underlying).await {
            Ok(date) => date,
            Err(error) => {
                warn!(underlying, error = %error, "Earnings lookup failed, using sentinel");
                far_future_earnings()
            }
        };
        (date - as_of).num_days()
    }

    async fn historical_volatility(&self, underlying: &str) -> Result<f64, EnrichmentError> {
        let closes = self
            .history
            .fetch_daily_closes(underlying, self.config.history_lookback_days)
            .await?;
        Ok(round2(sample_std_dev(&closes)))
    }
}

/// Chain entry for the exact strike when present, else the first row.
fn best_matching_contract<'a>(
    contracts: &'a [ChainContract],
    symbol: &OptionSymbol,
) -> Option<&'a ChainContract> {
    contracts
        .iter()
        .find(|contract| contract.strike == symbol.strike())
        .or_else(|| contracts.first())
}

/// Sample standard deviation of daily closes.
fn sample_std_dev(closes: &[DailyClose]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let values: Vec<f64> = closes
        .iter()
        .map(|close| close.close.to_f64().unwrap_or(0.0))
        .collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    variance.sqrt()
}

/// `|strike − spot| / historical volatility`, 0 when volatility is unknown.
fn strike_distance_in_vol_units(strike: Decimal, spot: Decimal, volatility: f64) -> f64 {
    if volatility <= f64::EPSILON {
        return 0.0;
    }
    let distance = (strike - spot).abs().to_f64().unwrap_or(0.0);
    round2(distance / volatility)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
