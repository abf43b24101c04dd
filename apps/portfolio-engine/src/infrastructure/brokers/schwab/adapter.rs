//! Schwab adapter: positions across all linked accounts, plus option chain
//! market data.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::application::ports::{
    BrokerError, ChainDataPort, ChainSnapshot, MarketDataError, PositionSource,
};
use crate::domain::{InstrumentType, OptionRight, OptionSymbol, Position};
use crate::infrastructure::brokers::http_client::BearerHttpClient;

use super::api_types::{AccountNumberEntry, AccountResponse, ChainResponse};
use super::config::SchwabConfig;

/// Schwab brokerage adapter.
///
/// Implements [`PositionSource`] over the trader API and [`ChainDataPort`]
/// over the market-data API.
#[derive(Debug, Clone)]
pub struct SchwabAdapter {
    client: BearerHttpClient,
    base_url: String,
}

impl SchwabAdapter {
    /// Create an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::AuthenticationFailed`] when the access token
    /// is missing, aborting the run before any fetch.
    pub fn new(config: &SchwabConfig) -> Result<Self, BrokerError> {
        let client = BearerHttpClient::new(
            config.access_token.clone(),
            config.timeout(),
            config.retry.clone(),
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    async fn fetch_account_hashes(&self) -> Result<Vec<String>, BrokerError> {
        let url = format!("{}/trader/v1/accounts/accountNumbers", self.base_url);
        let entries: Vec<AccountNumberEntry> = self.client.get_json(&url).await?;
        Ok(entries.into_iter().map(|entry| entry.hash_value).collect())
    }

    async fn fetch_account_positions(
        &self,
        account_hash: &str,
        account_index: usize,
    ) -> Result<Vec<Position>, BrokerError> {
        let url = format!(
            "{}/trader/v1/accounts/{account_hash}?fields=positions",
            self.base_url
        );
        let response: AccountResponse = self.client.get_json(&url).await?;
        let account = response.securities_account;

        let mut positions = Vec::new();
        for row in &account.positions {
            let quantity = row.signed_quantity();
            match row.instrument.asset_type.as_str() {
                "OPTION" => match OptionSymbol::parse_api_format(&row.instrument.symbol) {
                    Ok(symbol) => positions.push(Position::new(
                        symbol.to_string(),
                        InstrumentType::Option,
                        quantity,
                    )),
                    Err(err) => {
                        // Unparseable rows stay visible as stock rather
                        // than vanishing from the report.
                        warn!(symbol = %row.instrument.symbol, error = %err, "Option symbol did not normalize, keeping as stock");
                        positions.push(Position::new(
                            row.instrument.symbol.clone(),
                            InstrumentType::Stock,
                            quantity,
                        ));
                    }
                },
                "EQUITY" | "COLLECTIVE_INVESTMENT" => {
                    positions.push(Position::new(
                        row.instrument.symbol.clone(),
                        InstrumentType::Stock,
                        quantity,
                    ));
                }
                other => {
                    tracing::debug!(asset_type = other, symbol = %row.instrument.symbol, "Skipping unsupported asset type");
                }
            }
        }

        if let Some(balances) = account.initial_balances {
            positions.push(Position::new(
                format!("Schwab{account_index}"),
                InstrumentType::Cash,
                balances.cash_balance,
            ));
        }

        Ok(positions)
    }

    fn chain_url(
        &self,
        underlying: &str,
        right: OptionRight,
        strike: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> String {
        let strike_param = strike.map_or_else(String::new, |strike| format!("&strike={strike}"));
        format!(
            "{}/marketdata/v1/chains?symbol={underlying}&contractType={right}{strike_param}&fromDate={}&toDate={}",
            self.base_url,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        )
    }

    fn to_snapshot(
        underlying: &str,
        right: OptionRight,
        response: ChainResponse,
    ) -> Option<ChainSnapshot> {
        let exp_date_map = match right {
            OptionRight::Call => response.call_exp_date_map,
            OptionRight::Put => response.put_exp_date_map,
        };

        let contracts: Vec<_> = exp_date_map
            .values()
            .flat_map(|strikes| strikes.values())
            .flatten()
            .filter_map(super::api_types::ChainEntry::to_contract)
            .collect();

        if contracts.is_empty() {
            return None;
        }
        Some(ChainSnapshot {
            underlying: underlying.to_string(),
            underlying_price: response.underlying_price,
            contracts,
        })
    }
}

#[async_trait]
impl PositionSource for SchwabAdapter {
    fn name(&self) -> &'static str {
        "schwab"
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let hashes = self.fetch_account_hashes().await?;
        info!(accounts = hashes.len(), "Fetching Schwab positions");

        let mut positions = Vec::new();
        for (index, hash) in hashes.iter().enumerate() {
            positions.extend(self.fetch_account_positions(hash, index).await?);
        }
        Ok(positions)
    }
}

#[async_trait]
impl ChainDataPort for SchwabAdapter {
    async fn fetch_exact_chain(
        &self,
        symbol: &OptionSymbol,
    ) -> Result<Option<ChainSnapshot>, MarketDataError> {
        let expiration = symbol.expiration();
        let strike = symbol.strike().normalize().to_string();
        let url = self.chain_url(
            symbol.underlying(),
            symbol.right(),
            Some(&strike),
            expiration,
            expiration,
        );

        let response: ChainResponse = self.client.get_json(&url).await?;
        Ok(Self::to_snapshot(
            symbol.underlying(),
            symbol.right(),
            response,
        ))
    }

    async fn fetch_full_chain(
        &self,
        underlying: &str,
        right: OptionRight,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<ChainSnapshot>, MarketDataError> {
        let url = self.chain_url(underlying, right, None, from, to);
        let response: ChainResponse = self.client.get_json(&url).await?;

        let snapshot = Self::to_snapshot(underlying, right, response);
        if let Some(snapshot) = &snapshot {
            info!(
                underlying,
                contracts = snapshot.contracts.len(),
                "Fetched full chain"
            );
        }
        Ok(snapshot)
    }
}
