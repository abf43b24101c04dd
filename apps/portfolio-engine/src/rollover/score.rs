//! Quality scoring for rollover candidates.
//!
//! A surviving candidate gets a composite 0-100 score from six weighted
//! sub-scores: extrinsic decay efficiency (30), safety distance (25),
//! spread tightness (20), theta magnitude (15), IV similarity (5), and
//! open-interest liquidity (5).

use super::config::RolloverConfig;

/// Full-marks OTM distance band, percent.
const DISTANCE_BAND_LOW: f64 = 5.0;
const DISTANCE_BAND_HIGH: f64 = 15.0;
/// Distance at which the near-side penalty reaches zero.
const DISTANCE_FLOOR: f64 = 2.0;

/// Spread granting full marks, percent.
const SPREAD_FULL: f64 = 5.0;
/// Spread where the gentle penalty ends and the steep one starts.
const SPREAD_KNEE: f64 = 10.0;

/// Inputs for one candidate's quality score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    /// Candidate extrinsic value per day.
    pub extrinsic_per_day: f64,
    /// Candidate strike.
    pub strike: f64,
    /// Distance from spot, percent (negative = OTM).
    pub distance_pct: f64,
    /// Bid-ask spread, percent of mid.
    pub bid_ask_spread_pct: f64,
    /// Candidate theta.
    pub theta: f64,
    /// Candidate implied volatility.
    pub implied_vol: f64,
    /// The current position's implied volatility.
    pub current_implied_vol: f64,
    /// Candidate open interest.
    pub open_interest: i64,
}

/// Composite quality score.
#[must_use]
pub fn quality_score(inputs: &ScoreInputs, config: &RolloverConfig) -> f64 {
    extrinsic_efficiency_score(
        inputs.extrinsic_per_day,
        inputs.strike,
        config.reference_extrinsic_per_day,
    ) + safety_distance_score(inputs.distance_pct)
        + spread_tightness_score(inputs.bid_ask_spread_pct)
        + theta_score(inputs.theta, config.reference_theta)
        + iv_similarity_score(inputs.implied_vol, inputs.current_implied_vol)
        + liquidity_score(inputs.open_interest, config.reference_open_interest)
}

/// Extrinsic-per-day normalized per $100 of strike against the reference
/// decay rate, capped at 30.
#[must_use]
pub fn extrinsic_efficiency_score(extrinsic_per_day: f64, strike: f64, reference: f64) -> f64 {
    if strike <= 0.0 || reference <= 0.0 {
        return 0.0;
    }
    let per_day_pct = extrinsic_per_day / (strike / 100.0);
    (per_day_pct / reference).min(1.0) * 30.0
}

/// Full 25 points for 5-15% OTM; linear penalties when too far OTM or too
/// close to spot, floored at zero.
#[must_use]
pub fn safety_distance_score(distance_pct: f64) -> f64 {
    let abs_distance = distance_pct.abs();
    if (DISTANCE_BAND_LOW..=DISTANCE_BAND_HIGH).contains(&abs_distance) {
        25.0
    } else if abs_distance > DISTANCE_BAND_HIGH {
        (25.0 - (abs_distance - DISTANCE_BAND_HIGH)).max(0.0)
    } else {
        ((abs_distance - DISTANCE_FLOOR) / 3.0 * 25.0).max(0.0)
    }
}

/// Full 20 points at or below a 5% spread, gentle decay to 10%, steeper
/// decay from 10% to 20%.
#[must_use]
pub fn spread_tightness_score(spread_pct: f64) -> f64 {
    if spread_pct <= SPREAD_FULL {
        20.0
    } else if spread_pct <= SPREAD_KNEE {
        20.0 - (spread_pct - SPREAD_FULL)
    } else {
        (15.0 - (spread_pct - SPREAD_KNEE)).max(0.0)
    }
}

/// Theta magnitude scaled against the reference decay rate, capped at 15.
#[must_use]
pub fn theta_score(theta: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    (theta.abs() / reference).min(1.0) * 15.0
}

/// Linear falloff with relative IV difference from the current position,
/// floored at zero; max 5.
#[must_use]
pub fn iv_similarity_score(implied_vol: f64, current_implied_vol: f64) -> f64 {
    let iv_diff = (implied_vol - current_implied_vol).abs() / current_implied_vol.max(0.01);
    (1.0 - iv_diff.min(1.0)) * 5.0
}

/// Open interest scaled against the reference, capped at 5.
#[must_use]
pub fn liquidity_score(open_interest: i64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    (open_interest as f64 / reference).min(1.0) * 5.0
}
