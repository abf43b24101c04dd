//! Brokerage adapters - one position source per brokerage.

pub mod fidelity;
pub mod http_client;
pub mod ib;
pub mod schwab;
pub mod tradestation;

pub use fidelity::{FidelityRow, FidelitySource};
pub use http_client::{BearerHttpClient, HttpError, RetryConfig};
pub use ib::{IbRow, IbSource};
pub use schwab::{SchwabAdapter, SchwabConfig};
pub use tradestation::{TradeStationAdapter, TradeStationConfig};
