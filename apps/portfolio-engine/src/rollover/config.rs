//! Rollover search configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One pass of the rollover search: expiration window, minimum
/// out-of-the-money distance, and debit tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTier {
    /// Label used in logs.
    pub label: String,
    /// Scan contracts expiring within this many days.
    pub days_out: i64,
    /// Minimum OTM distance from spot, percent.
    pub min_distance_pct: f64,
    /// Allowed net debit as a fraction of the current option's extrinsic.
    pub max_debit_ratio: Decimal,
}

impl SearchTier {
    /// Strict first pass: 45-day window, 2% OTM, debit up to 20% of
    /// extrinsic.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            label: "strict".to_string(),
            days_out: 45,
            min_distance_pct: 2.0,
            max_debit_ratio: Decimal::new(20, 2),
        }
    }

    /// Relaxed fallback: 90-day window, 1% OTM, debit up to 30% of
    /// extrinsic.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            label: "relaxed".to_string(),
            days_out: 90,
            min_distance_pct: 1.0,
            max_debit_ratio: Decimal::new(30, 2),
        }
    }
}

/// Rollover engine configuration.
///
/// The tier constants and score reference rates are long-standing
/// operational values; they are parameters, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloverConfig {
    /// Search tiers, attempted in order; the first tier with any surviving
    /// candidate wins.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<SearchTier>,
    /// Reject candidates whose bid-ask spread exceeds this percentage of
    /// mid.
    #[serde(default = "default_max_spread_pct")]
    pub max_spread_pct: f64,
    /// Reference extrinsic decay rate: dollars per day per $100 of strike
    /// considered excellent.
    #[serde(default = "default_reference_extrinsic_per_day")]
    pub reference_extrinsic_per_day: f64,
    /// Reference theta decay for a full theta sub-score.
    #[serde(default = "default_reference_theta")]
    pub reference_theta: f64,
    /// Open interest granting a full liquidity sub-score.
    #[serde(default = "default_reference_open_interest")]
    pub reference_open_interest: f64,
}

fn default_tiers() -> Vec<SearchTier> {
    vec![SearchTier::strict(), SearchTier::relaxed()]
}

fn default_max_spread_pct() -> f64 {
    20.0
}

fn default_reference_extrinsic_per_day() -> f64 {
    0.10
}

fn default_reference_theta() -> f64 {
    1.0
}

fn default_reference_open_interest() -> f64 {
    100.0
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            max_spread_pct: default_max_spread_pct(),
            reference_extrinsic_per_day: default_reference_extrinsic_per_day(),
            reference_theta: default_reference_theta(),
            reference_open_interest: default_reference_open_interest(),
        }
    }
}
