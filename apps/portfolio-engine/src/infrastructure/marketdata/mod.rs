//! Market data adapters - price history and earnings dates.

mod finnhub;
mod yahoo;

pub use finnhub::FinnhubEarningsAdapter;
pub use yahoo::YahooHistoryAdapter;
