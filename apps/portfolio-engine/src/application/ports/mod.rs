//! Application ports - interfaces to external collaborators.
//!
//! All outbound dependencies of the core (brokerage positions, chain data,
//! price history, earnings dates) are driven ports; infrastructure provides
//! the adapters.

mod chain_data;
mod earnings;
mod position_source;
mod price_history;

pub use chain_data::{ChainContract, ChainDataPort, ChainSnapshot, MarketDataError};
pub use earnings::{EarningsPort, far_future_earnings};
pub use position_source::{BrokerError, PositionSource};
pub use price_history::{DailyClose, PriceHistoryPort};
