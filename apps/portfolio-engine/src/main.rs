//! Portfolio Engine Binary
//!
//! Runs one batch evaluation: fetch positions from every configured
//! brokerage, enrich option positions, search rollovers for flagged short
//! options, and print the report as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin portfolio-engine [config.yaml]
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `SCHWAB_ACCESS_TOKEN`: Schwab API access token (positions + chains)
//! - `FINNHUB_API_KEY`: Finnhub API key (earnings calendar)
//!
//! ## Optional
//! - `TRADESTATION_ACCESS_TOKEN` / `TRADESTATION_ACCOUNT_ID`: TradeStation
//! - `RUST_LOG`: Log level (default: info)

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use portfolio_engine::application::ports::{ChainDataPort, EarningsPort, PositionSource};
use portfolio_engine::application::services::{OptionEnricher, load_portfolio};
use portfolio_engine::config::{Config, load_config, require_credentials};
use portfolio_engine::infrastructure::brokers::{
    FidelitySource, IbSource, SchwabAdapter, TradeStationAdapter,
};
use portfolio_engine::infrastructure::marketdata::{FinnhubEarningsAdapter, YahooHistoryAdapter};
use portfolio_engine::observability::init_tracing;
use portfolio_engine::report::ReportBuilder;
use portfolio_engine::rollover::RolloverEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))
        .context("failed to load configuration")?;

    init_tracing(&config.logging);
    tracing::info!("Starting portfolio engine");

    // Credentials must be valid before anything is fetched.
    require_credentials(&config).context("credential validation failed")?;

    let schwab = Arc::new(
        SchwabAdapter::new(&config.brokers.schwab).context("failed to build Schwab adapter")?,
    );
    let sources = build_sources(&config, schwab.clone())?;

    let earnings: Arc<dyn EarningsPort> = Arc::new(
        FinnhubEarningsAdapter::new(config.market_data.finnhub_api_key.clone())
            .context("failed to build earnings adapter")?,
    );
    let history = Arc::new(YahooHistoryAdapter::new().context("failed to build history adapter")?);

    let chain: Arc<dyn ChainDataPort> = schwab;
    let enricher = OptionEnricher::new(
        chain.clone(),
        history,
        earnings.clone(),
        config.enrichment.clone(),
    );

    let as_of = Utc::now().date_naive();
    let portfolio = load_portfolio(&sources, &enricher, as_of).await;

    let engine = RolloverEngine::new(chain, config.rollover.clone());
    let report = ReportBuilder::new(engine, earnings)
        .build(&portfolio, as_of)
        .await;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );
    Ok(())
}

/// Wire up every enabled position source.
fn build_sources(
    config: &Config,
    schwab: Arc<SchwabAdapter>,
) -> anyhow::Result<Vec<Arc<dyn PositionSource>>> {
    let mut sources: Vec<Arc<dyn PositionSource>> = Vec::new();

    if config.brokers.schwab.enabled {
        sources.push(schwab);
    }
    if config.brokers.tradestation.enabled {
        sources.push(Arc::new(
            TradeStationAdapter::new(&config.brokers.tradestation)
                .context("failed to build TradeStation adapter")?,
        ));
    }
    if let Some(path) = &config.brokers.fidelity.rows_path {
        sources.push(Arc::new(
            FidelitySource::from_json_file(path).context("failed to load Fidelity rows")?,
        ));
    }
    if let Some(path) = &config.brokers.ib.rows_path {
        sources.push(Arc::new(
            IbSource::from_json_file(path).context("failed to load IB rows")?,
        ));
    }

    tracing::info!(sources = sources.len(), "Position sources configured");
    Ok(sources)
}
