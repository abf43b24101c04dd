//! Rollover candidate search and scoring.
//!
//! For a flagged short option position:
//! - Strict pass over the next 45 days of chain, then a relaxed fallback
//!   over 90 days
//! - Ordered filters: time extension, tradable quote, spread cap,
//!   strictly OTM, minimum distance, debit tolerance
//! - Survivors ranked by a weighted 0-100 quality score with a
//!   deterministic tie-break

mod candidate;
mod config;
mod engine;
mod score;

pub use candidate::RolloverCandidate;
pub use config::{RolloverConfig, SearchTier};
pub use engine::RolloverEngine;
pub use score::{
    ScoreInputs, extrinsic_efficiency_score, iv_similarity_score, liquidity_score, quality_score,
    safety_distance_score, spread_tightness_score, theta_score,
};
