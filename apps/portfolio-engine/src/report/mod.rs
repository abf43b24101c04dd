//! Report assembly.
//!
//! Turns the enriched portfolio into tabular rows (options with rollover
//! recommendations, stocks, cash, and a per-underlying greek exposure
//! summary). Presentation beyond row assembly - styling, transport - is
//! outside the engine.

mod exposure;
mod rows;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use exposure::{ExposureRow, aggregate_exposure};
pub use rows::{CashRow, OptionRow, StockRow, sort_option_rows};

use crate::application::ports::{EarningsPort, far_future_earnings};
use crate::domain::{InstrumentType, OptionSymbol, Portfolio};
use crate::rollover::RolloverEngine;

/// Full report payload for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Option rows, sorted by expiration then symbol.
    pub options: Vec<OptionRow>,
    /// Stock rows.
    pub stocks: Vec<StockRow>,
    /// Cash rows.
    pub cash: Vec<CashRow>,
    /// Sum of all cash balances.
    pub cash_total: Decimal,
    /// Per-underlying greek exposure.
    pub exposure: Vec<ExposureRow>,
}

/// Builds the report from an enriched portfolio.
pub struct ReportBuilder {
    rollover: RolloverEngine,
    earnings: Arc<dyn EarningsPort>,
}

impl ReportBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new(rollover: RolloverEngine, earnings: Arc<dyn EarningsPort>) -> Self {
        Self { rollover, earnings }
    }

    /// Assemble the report, searching for a rollover on every flagged
    /// short option.
    pub async fn build(&self, portfolio: &Portfolio, as_of: NaiveDate) -> Report {
        let mut options = Vec::new();
        for position in portfolio.of_type(InstrumentType::Option) {
            let Some(analytics) = &position.analytics else {
                warn!(symbol = %position.symbol, "Skipping unenriched option position");
                continue;
            };
            let symbol: OptionSymbol = match position.symbol.parse() {
                Ok(symbol) => symbol,
                Err(err) => {
                    warn!(symbol = %position.symbol, error = %err, "Skipping option row with invalid symbol");
                    continue;
                }
            };

            let rollover = self
                .rollover
                .find_best_rollover(&symbol, analytics, position.quantity, as_of)
                .await;
            options.push(OptionRow::build(position, &symbol, analytics, rollover));
        }
        sort_option_rows(&mut options);

        let mut stocks = Vec::new();
        for position in portfolio.of_type(InstrumentType::Stock) {
            stocks.push(StockRow {
                symbol: position.symbol.clone(),
                quantity: position.quantity,
                days_to_earnings: self.days_to_earnings(&position.symbol, as_of).await,
                delta: 1.0,
                unit: 1,
            });
        }

        let cash: Vec<CashRow> = portfolio
            .of_type(InstrumentType::Cash)
            .map(|position| CashRow {
                symbol: position.symbol.clone(),
                quantity: position.quantity,
            })
            .collect();
        let cash_total = cash.iter().map(|row| row.quantity).sum();

        let exposure = aggregate_exposure(&options, &stocks);

        info!(
            options = options.len(),
            stocks = stocks.len(),
            cash_rows = cash.len(),
            rollovers = options.iter().filter(|row| row.roll_to.is_some()).count(),
            "Report assembled"
        );

        Report {
            options,
            stocks,
            cash,
            cash_total,
            exposure,
        }
    }

    async fn days_to_earnings(&self, symbol: &str, as_of: NaiveDate) -> i64 {
        let date = match self.earnings.fetch_next_earnings_date(symbol).await {
            Ok(date) => date,
            Err(error) => {
                warn!(symbol, error = %error, "Earnings lookup failed, using sentinel");
                far_future_earnings()
            }
        };
        (date - as_of).num_days()
    }
}
