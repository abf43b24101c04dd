// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Portfolio Engine - Rust Core Library
//!
//! One-shot batch engine for option portfolio analysis:
//!
//! - Aggregates positions from multiple brokerage sources into one
//!   portfolio view
//! - Enriches option positions with chain data and derived analytics
//! - Flags positions with assignment risk or exhausted time value
//! - Recommends the best rollover contract for flagged short options via
//!   a tiered, score-ranked chain search
//!
//! # Architecture
//!
//! - **Domain**: positions, canonical option symbols, derived analytics
//! - **Application**: driven ports (`PositionSource`, `ChainDataPort`,
//!   `PriceHistoryPort`, `EarningsPort`) and services (enrichment,
//!   portfolio loading)
//! - **Rollover**: candidate search, filters, and quality scoring
//! - **Infrastructure**: Schwab/TradeStation HTTP adapters,
//!   Fidelity/IB export-row sources, Yahoo/Finnhub market data
//! - **Report**: tabular rows and greek exposure assembly

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - core business types with no external dependencies.
pub mod domain;

/// Application layer - ports and services.
pub mod application;

/// Rollover candidate search and scoring.
pub mod rollover;

/// Infrastructure layer - brokerage and market data adapters.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Structured logging setup.
pub mod observability;

/// Report row assembly.
pub mod report;

// Domain re-exports
pub use domain::{
    InstrumentType, OptionAnalytics, OptionRight, OptionSymbol, Portfolio, Position, SymbolError,
};

// Application re-exports
pub use application::ports::{
    BrokerError, ChainContract, ChainDataPort, ChainSnapshot, DailyClose, EarningsPort,
    MarketDataError, PositionSource, PriceHistoryPort,
};
pub use application::services::{
    EnrichmentConfig, EnrichmentError, OptionEnricher, load_portfolio,
};

// Rollover re-exports
pub use rollover::{RolloverCandidate, RolloverConfig, RolloverEngine, SearchTier};

// Infrastructure re-exports
pub use infrastructure::brokers::{
    FidelitySource, IbSource, SchwabAdapter, SchwabConfig, TradeStationAdapter,
    TradeStationConfig,
};
pub use infrastructure::marketdata::{FinnhubEarningsAdapter, YahooHistoryAdapter};

// Report re-exports
pub use report::{Report, ReportBuilder};
