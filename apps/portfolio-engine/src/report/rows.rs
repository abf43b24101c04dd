//! Report row assembly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::{OptionAnalytics, OptionRight, OptionSymbol, Position};
use crate::rollover::RolloverCandidate;

/// One option position row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRow {
    /// Underlying ticker.
    pub symbol: String,
    /// In-the-money flag.
    pub in_the_money: bool,
    /// Recommended rollover contract, without the underlying prefix
    /// (e.g. `251219C131`).
    pub roll_to: Option<String>,
    /// Action-needed flag.
    pub action_needed: bool,
    /// Option mid price.
    pub price: Decimal,
    /// Days to expiration.
    pub days_to_expiration: i64,
    /// Days to next earnings.
    pub days_to_earnings: i64,
    /// Signed contract count.
    pub quantity: Decimal,
    /// Extrinsic value.
    pub extrinsic: Decimal,
    /// Annualized extrinsic yield on strike, percent; negative for long
    /// positions.
    pub apr_pct: i64,
    /// APR weighted by the signed strike distance.
    pub apr_x_std: f64,
    /// Call or put.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
    /// Underlying spot price.
    pub underlying_price: Decimal,
    /// Strike distance in volatility units, negative when ITM.
    pub x_std: f64,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Delta.
    pub delta: f64,
    /// Gamma.
    pub gamma: f64,
    /// Theta.
    pub theta: f64,
    /// Vega.
    pub vega: f64,
    /// Open interest.
    pub open_interest: i64,
    /// Implied volatility.
    pub implied_vol: f64,
    /// Contract multiplier.
    pub unit: u32,
    /// Full rollover recommendation, when one was found.
    pub rollover: Option<RolloverCandidate>,
}

impl OptionRow {
    /// Assemble a row from an enriched option position.
    #[must_use]
    pub fn build(
        position: &Position,
        symbol: &OptionSymbol,
        analytics: &OptionAnalytics,
        rollover: Option<RolloverCandidate>,
    ) -> Self {
        let apr_pct = display_apr(
            analytics.extrinsic,
            symbol.strike(),
            analytics.days_to_expiration,
            position.quantity,
        );
        let x_std = analytics.signed_x_std();
        let roll_to = rollover.as_ref().map(|candidate| {
            let full = candidate
                .unified_symbol(symbol.underlying(), symbol.right())
                .to_string();
            full.split_once('_')
                .map_or(full.clone(), |(_, suffix)| suffix.to_string())
        });

        Self {
            symbol: symbol.underlying().to_string(),
            in_the_money: analytics.in_the_money,
            roll_to,
            action_needed: analytics.action_needed,
            price: analytics.mid_price,
            days_to_expiration: analytics.days_to_expiration,
            days_to_earnings: analytics.days_to_earnings,
            quantity: position.quantity,
            extrinsic: analytics.extrinsic,
            apr_pct,
            apr_x_std: apr_pct as f64 * x_std,
            right: symbol.right(),
            strike: symbol.strike(),
            underlying_price: analytics.underlying_price,
            x_std,
            expiration: symbol.expiration(),
            delta: analytics.delta,
            gamma: analytics.gamma,
            theta: analytics.theta,
            vega: analytics.vega,
            open_interest: analytics.open_interest,
            implied_vol: analytics.implied_vol,
            unit: 100,
            rollover,
        }
    }
}

/// One stock position row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRow {
    /// Ticker.
    pub symbol: String,
    /// Signed share count.
    pub quantity: Decimal,
    /// Days to next earnings.
    pub days_to_earnings: i64,
    /// Delta (1 per share).
    pub delta: f64,
    /// Share multiplier.
    pub unit: u32,
}

/// One cash balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRow {
    /// Balance label.
    pub symbol: String,
    /// Balance amount.
    pub quantity: Decimal,
}

/// Annualized extrinsic yield on the strike, percent, rounded to a whole
/// number. Sign: positive for short positions (income), negative for long.
fn display_apr(extrinsic: Decimal, strike: Decimal, days_to_expiration: i64, quantity: Decimal) -> i64 {
    let extrinsic = extrinsic.to_f64().unwrap_or(0.0);
    let strike = strike.to_f64().unwrap_or(0.0);
    if strike <= 0.0 {
        return 0;
    }
    let yield_ratio = (extrinsic * 100.0) / (strike * 100.0);
    let annualized = yield_ratio * (365.0 / (days_to_expiration + 1) as f64) * 100.0;
    let sign = if quantity > Decimal::ZERO { -1.0 } else { 1.0 };
    (annualized * sign).round() as i64
}

/// Sort option rows for display: soonest expiration first, then symbol.
pub fn sort_option_rows(rows: &mut [OptionRow]) {
    rows.sort_by(|a, b| {
        a.days_to_expiration
            .cmp(&b.days_to_expiration)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}
