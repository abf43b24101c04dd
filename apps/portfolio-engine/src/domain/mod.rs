//! Domain layer - positions, canonical option symbols, derived analytics.

pub mod analytics;
pub mod position;
pub mod symbol;

pub use analytics::{OptionAnalytics, intrinsic_value};
pub use position::{InstrumentType, Portfolio, Position};
pub use symbol::{OptionRight, OptionSymbol, SymbolError};
