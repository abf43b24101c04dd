//! Application services - enrichment and portfolio loading.

mod enricher;
mod portfolio_loader;

pub use enricher::{EnrichmentConfig, EnrichmentError, OptionEnricher};
pub use portfolio_loader::load_portfolio;
