//! Portfolio loading pipeline.
//!
//! Pulls positions from every configured source, enriches option positions
//! one at a time, and aggregates everything into the run's portfolio.
//! Failures are isolated: a failing source or position is logged and
//! skipped, never fatal to the run.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::application::ports::PositionSource;
use crate::application::services::enricher::OptionEnricher;
use crate::domain::Portfolio;

/// Load and enrich the portfolio from all sources, sequentially.
pub async fn load_portfolio(
    sources: &[Arc<dyn PositionSource>],
    enricher: &OptionEnricher,
    as_of: NaiveDate,
) -> Portfolio {
    let mut portfolio = Portfolio::new();

    for source in sources {
        let positions = match source.fetch_positions().await {
            Ok(positions) => positions,
            Err(err) => {
                error!(source = source.name(), error = %err, "Position fetch failed, skipping source");
                continue;
            }
        };
        info!(
            source = source.name(),
            count = positions.len(),
            "Fetched positions"
        );

        for position in positions {
            match enricher.enrich(position, as_of).await {
                Ok(Some(position)) => portfolio.add(position),
                Ok(None) => {}
                Err(err) => {
                    warn!(source = source.name(), error = %err, "Enrichment failed, dropping position");
                }
            }
        }
    }

    info!(positions = portfolio.len(), "Portfolio loaded");
    portfolio
}
