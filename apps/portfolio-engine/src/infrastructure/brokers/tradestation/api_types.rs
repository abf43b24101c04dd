//! Serde types for the TradeStation brokerage API.

use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /v3/brokerage/accounts/{id}/positions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PositionsResponse {
    /// Position rows.
    #[serde(default)]
    pub positions: Vec<ApiPosition>,
}

/// One position row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiPosition {
    /// `STOCKOPTION`/`OPTION` or `STOCK`.
    pub asset_type: String,
    /// Broker-format symbol.
    pub symbol: String,
    /// Unsigned contract/share count.
    #[serde(default)]
    pub quantity: Decimal,
    /// `Long` or `Short`.
    #[serde(default)]
    pub long_short: String,
}

impl ApiPosition {
    /// Signed quantity: negative for short rows.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        if self.long_short.eq_ignore_ascii_case("short") {
            -self.quantity
        } else {
            self.quantity
        }
    }
}

/// `GET /v3/brokerage/accounts/{id}/balances`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BalancesResponse {
    /// Per-account balances.
    #[serde(default)]
    pub balances: Vec<AccountBalance>,
}

/// One account's balances.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountBalance {
    /// Cash balance.
    #[serde(default)]
    pub cash_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn signed_quantity_flips_shorts() {
        let raw = r#"{
            "AssetType": "STOCKOPTION",
            "Symbol": "JD 240524C32000",
            "Quantity": 2,
            "LongShort": "Short"
        }"#;
        let position: ApiPosition = serde_json::from_str(raw).unwrap();
        assert_eq!(position.signed_quantity(), dec!(-2));
    }
}
