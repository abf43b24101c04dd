//! Serde types for the Schwab trader and market-data APIs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::ChainContract;

/// One entry of `GET /trader/v1/accounts/accountNumbers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberEntry {
    /// Plain account number.
    #[serde(default)]
    pub account_number: String,
    /// Opaque hash used in account-scoped URLs.
    pub hash_value: String,
}

/// `GET /trader/v1/accounts/{hash}?fields=positions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// The account with positions and balances.
    pub securities_account: SecuritiesAccount,
}

/// Account payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritiesAccount {
    /// Open positions; absent for empty accounts.
    #[serde(default)]
    pub positions: Vec<ApiPosition>,
    /// Opening balances.
    pub initial_balances: Option<InitialBalances>,
}

/// One brokerage position row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPosition {
    /// Instrument descriptor.
    pub instrument: ApiInstrument,
    /// Long quantity.
    #[serde(default)]
    pub long_quantity: Decimal,
    /// Short quantity.
    #[serde(default)]
    pub short_quantity: Decimal,
}

impl ApiPosition {
    /// Signed quantity: long minus short.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        self.long_quantity - self.short_quantity
    }
}

/// Instrument descriptor inside a position row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInstrument {
    /// `OPTION`, `EQUITY`, `COLLECTIVE_INVESTMENT`, ...
    pub asset_type: String,
    /// Broker-format symbol.
    pub symbol: String,
}

/// Opening balances.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialBalances {
    /// Cash balance.
    #[serde(default)]
    pub cash_balance: Decimal,
}

/// `GET /marketdata/v1/chains?...`.
///
/// Contracts are keyed by `"YYYY-MM-DD:dte"` then by strike string; the
/// `BTreeMap`s keep provider iteration deterministic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    /// Underlying spot price.
    #[serde(default)]
    pub underlying_price: Decimal,
    /// Call side of the chain.
    #[serde(default)]
    pub call_exp_date_map: BTreeMap<String, BTreeMap<String, Vec<ChainEntry>>>,
    /// Put side of the chain.
    #[serde(default)]
    pub put_exp_date_map: BTreeMap<String, BTreeMap<String, Vec<ChainEntry>>>,
}

/// One contract in a chain response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    /// Best bid.
    #[serde(default)]
    pub bid: Decimal,
    /// Best ask.
    #[serde(default)]
    pub ask: Decimal,
    /// Delta.
    #[serde(default)]
    pub delta: f64,
    /// Gamma.
    #[serde(default)]
    pub gamma: f64,
    /// Theta.
    #[serde(default)]
    pub theta: f64,
    /// Vega.
    #[serde(default)]
    pub vega: f64,
    /// Implied volatility.
    #[serde(default)]
    pub volatility: f64,
    /// Open interest.
    #[serde(default)]
    pub open_interest: i64,
    /// Days to expiration.
    #[serde(default)]
    pub days_to_expiration: i64,
    /// Strike price.
    pub strike_price: Decimal,
    /// Whether the contract is in-the-money.
    #[serde(default)]
    pub in_the_money: bool,
    /// Expiration date, `YYYY-MM-DD` with an optional time suffix.
    pub expiration_date: String,
}

impl ChainEntry {
    /// Convert to the port's contract type.
    ///
    /// Returns `None` when the expiration date cannot be parsed.
    #[must_use]
    pub fn to_contract(&self) -> Option<ChainContract> {
        let date_part = self
            .expiration_date
            .split_once('T')
            .map_or(self.expiration_date.as_str(), |(date, _)| date);
        let expiration = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;

        Some(ChainContract {
            strike: self.strike_price,
            expiration,
            days_to_expiration: self.days_to_expiration,
            bid: self.bid,
            ask: self.ask,
            delta: self.delta,
            gamma: self.gamma,
            theta: self.theta,
            vega: self.vega,
            implied_vol: self.volatility,
            open_interest: self.open_interest,
            in_the_money: self.in_the_money,
        })
    }
}
