//! Schwab brokerage adapter.

mod adapter;
mod api_types;
mod config;

pub use adapter::SchwabAdapter;
pub use api_types::{AccountNumberEntry, AccountResponse, ChainEntry, ChainResponse};
pub use config::SchwabConfig;
