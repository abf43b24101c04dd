//! Tiered rollover candidate search.
//!
//! Given a flagged short option, scans a full chain of later-dated
//! contracts, filters under the active tier's constraints, scores the
//! survivors, and returns the best candidate. A strict pass runs first;
//! when it yields nothing the search retries once with relaxed criteria.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::application::ports::{ChainContract, ChainDataPort, ChainSnapshot};
use crate::domain::{OptionAnalytics, OptionRight, OptionSymbol, intrinsic_value};

use super::candidate::RolloverCandidate;
use super::config::{RolloverConfig, SearchTier};
use super::score::{ScoreInputs, quality_score};

/// Why a chain contract was rejected during a search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// Does not extend time beyond the current expiration.
    Expiration,
    /// Untradable quote (bid or ask not positive).
    Pricing,
    /// Bid-ask spread too wide.
    Spread,
    /// In-the-money (assignment risk).
    InTheMoney,
    /// Too close to spot for the active tier.
    Distance,
    /// Debit beyond the active tier's tolerance.
    Debit,
}

/// Per-tier filter counters, logged for diagnostics.
#[derive(Debug, Default)]
struct FilterStats {
    checked: usize,
    by_expiration: usize,
    by_pricing: usize,
    by_spread: usize,
    by_itm: usize,
    by_distance: usize,
    by_debit: usize,
}

impl FilterStats {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Expiration => self.by_expiration += 1,
            Rejection::Pricing => self.by_pricing += 1,
            Rejection::Spread => self.by_spread += 1,
            Rejection::InTheMoney => self.by_itm += 1,
            Rejection::Distance => self.by_distance += 1,
            Rejection::Debit => self.by_debit += 1,
        }
    }
}

/// Rollover search engine over a chain data port.
pub struct RolloverEngine {
    chain: Arc<dyn ChainDataPort>,
    config: RolloverConfig,
}

impl RolloverEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(chain: Arc<dyn ChainDataPort>, config: RolloverConfig) -> Self {
        Self { chain, config }
    }

    /// Find the best rollover contract for a flagged short option.
    ///
    /// Returns `None` immediately for long positions or positions without
    /// the action flag, and `None` when no tier yields a surviving
    /// candidate — "no actionable rollover", never an error. Chain fetch
    /// failures are logged and treated as zero candidates for that tier.
    pub async fn find_best_rollover(
        &self,
        current: &OptionSymbol,
        analytics: &OptionAnalytics,
        position_quantity: Decimal,
        today: NaiveDate,
    ) -> Option<RolloverCandidate> {
        if position_quantity >= Decimal::ZERO {
            return None;
        }
        if !analytics.action_needed {
            debug!(symbol = %current, "No action needed, skipping rollover search");
            return None;
        }

        info!(
            symbol = %current,
            dte = analytics.days_to_expiration,
            strike = %current.strike(),
            extrinsic = %analytics.extrinsic,
            "Evaluating rollover candidates"
        );

        for tier in &self.config.tiers {
            let to = today
                .checked_add_days(Days::new(tier.days_out.unsigned_abs()))
                .unwrap_or(NaiveDate::MAX);

            let snapshot = match self
                .chain
                .fetch_full_chain(current.underlying(), current.right(), today, to)
                .await
            {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => {
                    info!(symbol = %current, tier = %tier.label, "No chain data for tier");
                    continue;
                }
                Err(error) => {
                    warn!(symbol = %current, tier = %tier.label, error = %error, "Chain fetch failed, treating tier as empty");
                    continue;
                }
            };

            let mut candidates = self.evaluate_tier(&snapshot, current, analytics, tier);
            if candidates.is_empty() {
                info!(symbol = %current, tier = %tier.label, "No surviving candidates in tier");
                continue;
            }

            rank(&mut candidates);
            for (index, candidate) in candidates.iter().take(5).enumerate() {
                debug!(
                    rank = index + 1,
                    dte = candidate.days_to_expiration,
                    strike = %candidate.strike,
                    extrinsic = %candidate.extrinsic,
                    distance_pct = candidate.distance_pct,
                    spread_pct = candidate.bid_ask_spread_pct,
                    quality = candidate.quality_score,
                    "Rollover candidate"
                );
            }

            let best = candidates.swap_remove(0);
            info!(
                symbol = %current,
                tier = %tier.label,
                roll_to = %best.unified_symbol(current.underlying(), current.right()),
                net_credit = %best.net_credit,
                quality = best.quality_score,
                "Selected rollover candidate"
            );
            return Some(best);
        }

        info!(symbol = %current, "No viable rollover candidate in any tier");
        None
    }

    /// Run one tier's filters over the snapshot and score the survivors.
    fn evaluate_tier(
        &self,
        snapshot: &ChainSnapshot,
        current: &OptionSymbol,
        analytics: &OptionAnalytics,
        tier: &SearchTier,
    ) -> Vec<RolloverCandidate> {
        let mut stats = FilterStats::default();
        let mut candidates = Vec::new();

        for contract in &snapshot.contracts {
            stats.checked += 1;
            match self.evaluate_contract(
                contract,
                snapshot.underlying_price,
                current.right(),
                analytics,
                tier,
            ) {
                Ok(candidate) => candidates.push(candidate),
                Err(rejection) => stats.record(rejection),
            }
        }

        info!(
            symbol = %current,
            tier = %tier.label,
            checked = stats.checked,
            by_expiration = stats.by_expiration,
            by_pricing = stats.by_pricing,
            by_spread = stats.by_spread,
            by_itm = stats.by_itm,
            by_distance = stats.by_distance,
            by_debit = stats.by_debit,
            survivors = candidates.len(),
            "Tier filter results"
        );
        candidates
    }

    /// Apply the ordered filters to one contract, scoring it on survival.
    fn evaluate_contract(
        &self,
        contract: &ChainContract,
        underlying_price: Decimal,
        right: OptionRight,
        analytics: &OptionAnalytics,
        tier: &SearchTier,
    ) -> Result<RolloverCandidate, Rejection> {
        // (a) A rollover must extend time.
        if contract.days_to_expiration <= analytics.days_to_expiration {
            return Err(Rejection::Expiration);
        }

        // (b) Tradable quote.
        if contract.bid <= Decimal::ZERO || contract.ask <= Decimal::ZERO {
            return Err(Rejection::Pricing);
        }

        // (c) Spread as a percentage of mid.
        let mid = contract.mid();
        let spread_pct = ((contract.ask - contract.bid) / mid * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(f64::INFINITY);
        if spread_pct > self.config.max_spread_pct {
            return Err(Rejection::Spread);
        }

        // (d) Strictly out-of-the-money; never roll into assignment risk.
        let intrinsic = intrinsic_value(right, underlying_price, contract.strike);
        if intrinsic > Decimal::ZERO {
            return Err(Rejection::InTheMoney);
        }
        let extrinsic = mid - intrinsic;

        // (e) Distance from spot; negative = OTM, more negative = safer.
        let distance_pct = distance_from_spot_pct(right, underlying_price, contract.strike);
        if distance_pct > -tier.min_distance_pct {
            return Err(Rejection::Distance);
        }

        // (f) Net of buying back the current contract and selling this one.
        let net_credit = mid - analytics.mid_price;
        if net_credit < Decimal::ZERO && -net_credit > analytics.extrinsic * tier.max_debit_ratio {
            return Err(Rejection::Debit);
        }

        let extrinsic_per_day =
            extrinsic.to_f64().unwrap_or(0.0) / contract.days_to_expiration as f64;
        let strike = contract.strike.to_f64().unwrap_or(0.0);
        let apr = if strike > 0.0 {
            extrinsic_per_day * 365.0 / strike * 100.0
        } else {
            0.0
        };

        let score = quality_score(
            &ScoreInputs {
                extrinsic_per_day,
                strike,
                distance_pct,
                bid_ask_spread_pct: spread_pct,
                theta: contract.theta,
                implied_vol: contract.implied_vol,
                current_implied_vol: analytics.implied_vol,
                open_interest: contract.open_interest,
            },
            &self.config,
        );

        Ok(RolloverCandidate {
            strike: contract.strike,
            expiration: contract.expiration,
            days_to_expiration: contract.days_to_expiration,
            bid: contract.bid,
            ask: contract.ask,
            mid_price: mid,
            bid_ask_spread_pct: spread_pct,
            net_credit,
            extrinsic,
            extrinsic_per_day,
            theta: contract.theta,
            delta: contract.delta,
            implied_vol: contract.implied_vol,
            open_interest: contract.open_interest,
            apr,
            quality_score: score,
            days_gained: contract.days_to_expiration - analytics.days_to_expiration,
            distance_pct,
            intrinsic,
        })
    }
}

/// Distance from spot, percent. OTM contracts are negative for both rights
/// (calls above spot, puts below), so that more negative = safer.
fn distance_from_spot_pct(right: OptionRight, underlying_price: Decimal, strike: Decimal) -> f64 {
    if underlying_price <= Decimal::ZERO {
        return f64::INFINITY;
    }
    let raw = match right {
        OptionRight::Call => (underlying_price - strike) / underlying_price,
        OptionRight::Put => (strike - underlying_price) / underlying_price,
    };
    (raw * Decimal::ONE_HUNDRED).to_f64().unwrap_or(f64::INFINITY)
}

/// Quality score descending; ties broken by lower absolute distance, then
/// higher open interest, so ranking never depends on chain iteration order.
fn rank(candidates: &mut [RolloverCandidate]) {
    candidates.sort_by(|a, b| {
        b.quality_score
            .partial_cmp(&a.quality_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.distance_pct
                    .abs()
                    .partial_cmp(&b.distance_pct.abs())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.open_interest.cmp(&a.open_interest))
    });
}
