//! TradeStation brokerage adapter.

mod adapter;
mod api_types;
mod config;

pub use adapter::TradeStationAdapter;
pub use api_types::{ApiPosition, BalancesResponse, PositionsResponse};
pub use config::TradeStationConfig;
