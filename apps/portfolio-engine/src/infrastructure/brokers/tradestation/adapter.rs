//! TradeStation adapter: positions plus the account cash balance.

use async_trait::async_trait;
use tracing::warn;

use crate::application::ports::{BrokerError, PositionSource};
use crate::domain::{InstrumentType, OptionSymbol, Position};
use crate::infrastructure::brokers::http_client::BearerHttpClient;

use super::api_types::{BalancesResponse, PositionsResponse};
use super::config::TradeStationConfig;

/// TradeStation brokerage adapter.
#[derive(Debug, Clone)]
pub struct TradeStationAdapter {
    client: BearerHttpClient,
    base_url: String,
    account_id: String,
}

impl TradeStationAdapter {
    /// Create an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::AuthenticationFailed`] when the access token
    /// or account ID is missing, aborting the run before any fetch.
    pub fn new(config: &TradeStationConfig) -> Result<Self, BrokerError> {
        if config.account_id.is_empty() {
            return Err(BrokerError::AuthenticationFailed);
        }
        let client = BearerHttpClient::new(
            config.access_token.clone(),
            config.timeout(),
            config.retry.clone(),
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            account_id: config.account_id.clone(),
        })
    }
}

#[async_trait]
impl PositionSource for TradeStationAdapter {
    fn name(&self) -> &'static str {
        "tradestation"
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let url = format!(
            "{}/v3/brokerage/accounts/{}/positions",
            self.base_url, self.account_id
        );
        let response: PositionsResponse = self.client.get_json(&url).await?;

        let mut positions = Vec::new();
        for row in &response.positions {
            let quantity = row.signed_quantity();
            if row.asset_type.contains("OPTION") {
                match OptionSymbol::parse_api_format(&row.symbol) {
                    Ok(symbol) => positions.push(Position::new(
                        symbol.to_string(),
                        InstrumentType::Option,
                        quantity,
                    )),
                    Err(err) => {
                        warn!(symbol = %row.symbol, error = %err, "Option symbol did not normalize, keeping as stock");
                        positions.push(Position::new(
                            row.symbol.clone(),
                            InstrumentType::Stock,
                            quantity,
                        ));
                    }
                }
            } else {
                positions.push(Position::new(
                    row.symbol.clone(),
                    InstrumentType::Stock,
                    quantity,
                ));
            }
        }

        let url = format!(
            "{}/v3/brokerage/accounts/{}/balances",
            self.base_url, self.account_id
        );
        let balances: BalancesResponse = self.client.get_json(&url).await?;
        if let Some(balance) = balances.balances.first() {
            positions.push(Position::new(
                "TradeStation",
                InstrumentType::Cash,
                balance.cash_balance,
            ));
        }

        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infrastructure::brokers::http_client::RetryConfig;

    fn adapter(base_url: String) -> TradeStationAdapter {
        TradeStationAdapter::new(&TradeStationConfig {
            enabled: true,
            access_token: "token".to_string(),
            account_id: "ACCT1".to_string(),
            base_url,
            timeout_secs: 5,
            retry: RetryConfig {
                max_attempts: 1,
                ..RetryConfig::default()
            },
        })
        .unwrap()
    }

    #[test]
    fn missing_account_id_aborts_construction() {
        let config = TradeStationConfig {
            access_token: "token".to_string(),
            ..TradeStationConfig::default()
        };
        assert!(matches!(
            TradeStationAdapter::new(&config),
            Err(BrokerError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn positions_and_cash_balance_are_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/brokerage/accounts/ACCT1/positions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Positions": [
                    {
                        "AssetType": "STOCKOPTION",
                        "Symbol": "JD 240524C32000",
                        "Quantity": 3,
                        "LongShort": "Short"
                    },
                    {
                        "AssetType": "STOCK",
                        "Symbol": "JD",
                        "Quantity": 100,
                        "LongShort": "Long"
                    }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/brokerage/accounts/ACCT1/balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Balances": [{"CashBalance": 5000.25}]
            })))
            .mount(&server)
            .await;

        let positions = adapter(server.uri()).fetch_positions().await.unwrap();

        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].symbol, "JD_240524C32");
        assert_eq!(positions[0].quantity, dec!(-3));
        assert_eq!(positions[1].instrument_type, InstrumentType::Stock);
        assert_eq!(positions[2].symbol, "TradeStation");
        assert_eq!(positions[2].quantity, dec!(5000.25));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/brokerage/accounts/ACCT1/positions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let result = adapter(server.uri()).fetch_positions().await;
        assert!(matches!(result, Err(BrokerError::Api { status: 400, .. })));
    }
}
