//! Positions and the per-run portfolio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::analytics::OptionAnalytics;

/// Instrument classification for a brokerage position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentType {
    /// Cash or money-market balance.
    Cash,
    /// Equity position.
    Stock,
    /// Option contract position.
    Option,
}

/// A single brokerage position.
///
/// Quantity sign: positive = long, negative = short. Two positions are the
/// same position iff `(symbol, instrument_type)` match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol; unified option format for options.
    pub symbol: String,
    /// Instrument classification.
    pub instrument_type: InstrumentType,
    /// Signed quantity (contracts, shares, or cash amount).
    pub quantity: Decimal,
    /// Derived option analytics, attached by enrichment.
    pub analytics: Option<OptionAnalytics>,
}

impl Position {
    /// Create a position with no analytics attached.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        instrument_type: InstrumentType,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            instrument_type,
            quantity,
            analytics: None,
        }
    }

    /// Whether this is a short position.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    /// Whether `other` refers to the same position.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.instrument_type == other.instrument_type
    }
}

/// Unordered collection of positions, unique by `(symbol, instrument_type)`.
///
/// Rebuilt on every run; aggregation sums quantities and never drops
/// zero-quantity entries. The linear scan per add is fine at
/// personal-portfolio cardinality and is not meant for high-cardinality use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    /// Create an empty portfolio.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Add a position, summing quantity into an existing entry for the same
    /// `(symbol, instrument_type)` if one exists.
    pub fn add(&mut self, position: Position) {
        if let Some(existing) = self
            .positions
            .iter_mut()
            .find(|existing| existing.same_position(&position))
        {
            existing.quantity += position.quantity;
            return;
        }
        self.positions.push(position);
    }

    /// All positions, in insertion order (no ordering guarantee for callers).
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Positions of one instrument type.
    pub fn of_type(&self, instrument_type: InstrumentType) -> impl Iterator<Item = &Position> {
        self.positions
            .iter()
            .filter(move |position| position.instrument_type == instrument_type)
    }

    /// Number of distinct positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the portfolio holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn add_sums_quantities_for_same_position() {
        let mut portfolio = Portfolio::new();
        portfolio.add(Position::new("JD_240524C32", InstrumentType::Option, dec!(3)));
        portfolio.add(Position::new("JD_240524C32", InstrumentType::Option, dec!(-1)));

        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio.positions()[0].quantity, dec!(2));
    }

    #[test]
    fn add_keeps_distinct_instrument_types_separate() {
        let mut portfolio = Portfolio::new();
        portfolio.add(Position::new("JD", InstrumentType::Stock, dec!(100)));
        portfolio.add(Position::new("JD", InstrumentType::Cash, dec!(100)));

        assert_eq!(portfolio.len(), 2);
    }

    #[test]
    fn add_keeps_zero_quantity_entries() {
        let mut portfolio = Portfolio::new();
        portfolio.add(Position::new("JD_240524C32", InstrumentType::Option, dec!(2)));
        portfolio.add(Position::new("JD_240524C32", InstrumentType::Option, dec!(-2)));

        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio.positions()[0].quantity, Decimal::ZERO);
    }

    #[test]
    fn short_detection() {
        let short = Position::new("JD_240524C32", InstrumentType::Option, dec!(-2));
        let long = Position::new("JD_240524C32", InstrumentType::Option, dec!(2));
        assert!(short.is_short());
        assert!(!long.is_short());
    }
}
