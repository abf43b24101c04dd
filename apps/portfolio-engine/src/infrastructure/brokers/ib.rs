//! Interactive Brokers export-row source.
//!
//! Consumes already-parsed rows from an IB portfolio export (reading the
//! CSV itself stays outside the core) and normalizes them to
//! CASH/STOCK/OPTION positions.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{BrokerError, PositionSource};
use crate::domain::{InstrumentType, OptionSymbol, Position};

/// Currency balance rows classified as cash.
#[allow(clippy::expect_used)]
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^USD").expect("valid pattern"));

/// Header/subtotal rows skipped outright.
const SKIPPED_ROWS: [&str; 3] = ["Cash Balances", "CNH", "Total (in USD)"];

/// Exchanges whose rows are kept as stock positions.
const STOCK_EXCHANGES: [&str; 3] = ["PINK", "NYSE", "NASDAQ"];

/// One already-parsed row from an IB portfolio export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbRow {
    /// Financial instrument description column.
    pub description: String,
    /// Position column.
    #[serde(default)]
    pub position: Option<Decimal>,
    /// Exchange column.
    #[serde(default)]
    pub exchange: Option<String>,
}

/// Interactive Brokers positions source over export rows.
#[derive(Debug, Clone)]
pub struct IbSource {
    rows: Vec<IbRow>,
}

impl IbSource {
    /// Create a source from rows.
    #[must_use]
    pub const fn from_rows(rows: Vec<IbRow>) -> Self {
        Self { rows }
    }

    /// Load rows from a JSON export file.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Input`] when the file cannot be read or
    /// decoded.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BrokerError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BrokerError::Input(e.to_string()))?;
        let rows = serde_json::from_str(&raw).map_err(|e| BrokerError::Input(e.to_string()))?;
        Ok(Self::from_rows(rows))
    }

    fn normalize(row: &IbRow) -> Option<Position> {
        let description = row.description.trim();
        if description.is_empty() || SKIPPED_ROWS.contains(&description) {
            debug!(description, "Skipping non-security row");
            return None;
        }
        let quantity = row.position.unwrap_or_default();

        if CURRENCY_RE.is_match(description) {
            // Cash balances aggregate under one symbol per source.
            return Some(Position::new("IB", InstrumentType::Cash, quantity.trunc()));
        }

        if let Ok(symbol) = OptionSymbol::parse_ib_description(description) {
            return Some(Position::new(
                symbol.to_string(),
                InstrumentType::Option,
                quantity,
            ));
        }

        let listed = row
            .exchange
            .as_deref()
            .is_some_and(|exchange| STOCK_EXCHANGES.iter().any(|e| exchange.eq_ignore_ascii_case(e)));
        if listed {
            return Some(Position::new(description, InstrumentType::Stock, quantity));
        }

        debug!(description, "Skipping unlisted row");
        None
    }
}

#[async_trait]
impl PositionSource for IbSource {
    fn name(&self) -> &'static str {
        "ib"
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        Ok(self.rows.iter().filter_map(Self::normalize).collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn row(description: &str, position: Decimal, exchange: Option<&str>) -> IbRow {
        IbRow {
            description: description.to_string(),
            position: Some(position),
            exchange: exchange.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn rows_normalize_to_positions() {
        let source = IbSource::from_rows(vec![
            row("Cash Balances", dec!(0), None),
            row("USD", dec!(1500.75), None),
            row("JD JUN2024 32 C [JD 240524C00032000 100]", dec!(-2), Some("CBOE")),
            row("JD", dec!(100), Some("NASDAQ")),
            row("Total (in USD)", dec!(99999), None),
        ]);

        let positions = source.fetch_positions().await.unwrap();

        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].symbol, "IB");
        assert_eq!(positions[0].instrument_type, InstrumentType::Cash);
        assert_eq!(positions[0].quantity, dec!(1500));
        assert_eq!(positions[1].symbol, "JD_240524C32");
        assert_eq!(positions[1].quantity, dec!(-2));
        assert_eq!(positions[2].instrument_type, InstrumentType::Stock);
    }

    #[tokio::test]
    async fn unlisted_rows_are_skipped() {
        let source = IbSource::from_rows(vec![row("SOMETHING ELSE", dec!(1), Some("IDEALPRO"))]);
        let positions = source.fetch_positions().await.unwrap();
        assert!(positions.is_empty());
    }
}
