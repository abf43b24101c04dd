//! Brokerage source configuration.

use serde::{Deserialize, Serialize};

use crate::infrastructure::brokers::{SchwabConfig, TradeStationConfig};

/// File-backed export source configuration (Fidelity, IB).
///
/// Points at a JSON file of already-parsed export rows; the source is
/// enabled iff a path is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRowsConfig {
    /// Path to the JSON row file.
    #[serde(default)]
    pub rows_path: Option<String>,
}

impl ExportRowsConfig {
    /// Whether this source participates in the run.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.rows_path.is_some()
    }
}

/// All brokerage sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokersConfig {
    /// Schwab (also the chain data provider).
    #[serde(default)]
    pub schwab: SchwabConfig,
    /// TradeStation.
    #[serde(default)]
    pub tradestation: TradeStationConfig,
    /// Fidelity export rows.
    #[serde(default)]
    pub fidelity: ExportRowsConfig,
    /// Interactive Brokers export rows.
    #[serde(default)]
    pub ib: ExportRowsConfig,
}
