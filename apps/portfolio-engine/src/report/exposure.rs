//! Per-underlying greek exposure summary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::OptionRight;

use super::rows::{OptionRow, StockRow};

/// Aggregate greek exposure for one underlying, across option and stock
/// positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRow {
    /// Underlying ticker.
    pub symbol: String,
    /// Net delta exposure in shares.
    pub delta: i64,
    /// Net gamma exposure.
    pub gamma: i64,
    /// Net vega exposure.
    pub vega: i64,
    /// Net theta exposure.
    pub theta: i64,
    /// Lots available to write covered calls against: short-call count
    /// plus stock lots of 100.
    pub covered_call_capability: i64,
}

#[derive(Debug, Default)]
struct Accumulator {
    delta: f64,
    gamma: f64,
    vega: f64,
    theta: f64,
    call_quantity: Decimal,
    stock_quantity: Decimal,
}

/// Aggregate exposure per underlying, sorted by symbol.
#[must_use]
pub fn aggregate_exposure(options: &[OptionRow], stocks: &[StockRow]) -> Vec<ExposureRow> {
    let mut by_symbol: BTreeMap<String, Accumulator> = BTreeMap::new();

    for row in options {
        let entry = by_symbol.entry(row.symbol.clone()).or_default();
        let scale = f64::from(row.unit) * row.quantity.to_f64().unwrap_or(0.0);
        entry.delta += row.delta * scale;
        entry.gamma += row.gamma * scale;
        entry.vega += row.vega * scale;
        entry.theta += row.theta * scale;
        if row.right == OptionRight::Call {
            entry.call_quantity += row.quantity;
        }
    }

    for row in stocks {
        let entry = by_symbol.entry(row.symbol.clone()).or_default();
        let scale = f64::from(row.unit) * row.quantity.to_f64().unwrap_or(0.0);
        entry.delta += row.delta * scale;
        entry.stock_quantity += row.quantity;
    }

    by_symbol
        .into_iter()
        .map(|(symbol, acc)| {
            let covered_call_capability = (acc.call_quantity
                + (acc.stock_quantity / Decimal::ONE_HUNDRED).floor())
            .to_i64()
            .unwrap_or(0);
            ExposureRow {
                symbol,
                delta: acc.delta.round() as i64,
                gamma: acc.gamma.round() as i64,
                vega: acc.vega.round() as i64,
                theta: acc.theta.round() as i64,
                covered_call_capability,
            }
        })
        .collect()
}
