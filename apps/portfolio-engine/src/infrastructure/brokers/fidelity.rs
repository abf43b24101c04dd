//! Fidelity export-row source.
//!
//! Consumes already-parsed rows from a Fidelity positions export (reading
//! the CSV itself stays outside the core) and normalizes them to
//! CASH/STOCK/OPTION positions.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ports::{BrokerError, PositionSource};
use crate::domain::{InstrumentType, OptionSymbol, Position};

/// Money-market symbols classified as cash balances.
#[allow(clippy::expect_used)]
static MONEY_MARKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FDRXX|SPAXX)").expect("valid pattern"));

/// Non-security rows skipped outright.
const SKIPPED_ROWS: [&str; 1] = ["Pending Activity"];

/// One already-parsed row from a Fidelity positions export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FidelityRow {
    /// Symbol column (option symbols carry a leading `-` when short).
    pub symbol: String,
    /// Account name column.
    #[serde(default)]
    pub account_name: String,
    /// Quantity column.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Current value column (used for money-market balances).
    #[serde(default)]
    pub current_value: Option<Decimal>,
}

/// Fidelity positions source over export rows.
#[derive(Debug, Clone)]
pub struct FidelitySource {
    rows: Vec<FidelityRow>,
}

impl FidelitySource {
    /// Create a source from rows.
    #[must_use]
    pub const fn from_rows(rows: Vec<FidelityRow>) -> Self {
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

    fn normalize(row: &FidelityRow) -> Option<Position> {
        let symbol = row.symbol.trim();
        if symbol.is_empty() || SKIPPED_ROWS.contains(&symbol) {
            debug!(symbol, "Skipping non-security row");
            return None;
        }

        if MONEY_MARKET_RE.is_match(symbol) {
            let balance = row.current_value.unwrap_or_default();
            return Some(Position::new(symbol, InstrumentType::Cash, balance));
        }

        let quantity = row.quantity.unwrap_or_default();
        match OptionSymbol::parse_fidelity(symbol) {
            Ok(option_symbol) => Some(Position::new(
                option_symbol.to_string(),
                InstrumentType::Option,
                quantity,
            )),
            Err(_) => Some(Position::new(symbol, InstrumentType::Stock, quantity)),
        }
    }
}

#[async_trait]
impl PositionSource for FidelitySource {
    fn name(&self) -> &'static str {
        "fidelity"
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let positions: Vec<Position> = self.rows.iter().filter_map(Self::normalize).collect();
        if positions.is_empty() && !self.rows.is_empty() {
            warn!("Fidelity rows produced no positions");
        }
        Ok(positions)
    }
}
