//! E2E Integration Test for the Batch Pipeline
//!
//! Drives the full flow with in-memory fixtures: position sources →
//! enrichment → aggregation → rollover search → report assembly.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use portfolio_engine::application::ports::{
    BrokerError, ChainContract, ChainDataPort, ChainSnapshot, DailyClose, EarningsPort,
    MarketDataError, PositionSource, PriceHistoryPort,
};
use portfolio_engine::application::services::{EnrichmentConfig, OptionEnricher, load_portfolio};
use portfolio_engine::domain::{InstrumentType, OptionRight, OptionSymbol, Position};
use portfolio_engine::report::ReportBuilder;
use portfolio_engine::rollover::{RolloverConfig, RolloverEngine};

// =============================================================================
// Fixtures
// =============================================================================

struct FixtureSource {
    name: &'static str,
    positions: Vec<Position>,
    fail: bool,
}

#[async_trait]
impl PositionSource for FixtureSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        if self.fail {
            return Err(BrokerError::Network("connection refused".to_string()));
        }
        Ok(self.positions.clone())
    }
}

/// Exact lookups serve the current contract; full-chain lookups serve the
/// rollover universe.
struct FixtureChain {
    spot: Decimal,
    current: ChainContract,
    rollover_universe: Vec<ChainContract>,
}

#[async_trait]
impl ChainDataPort for FixtureChain {
    async fn fetch_exact_chain(
        &self,
        symbol: &OptionSymbol,
    ) -> Result<Option<ChainSnapshot>, MarketDataError> {
        if symbol.strike() != self.current.strike {
            return Ok(None);
        }
        Ok(Some(ChainSnapshot {
            underlying: symbol.underlying().to_string(),
            underlying_price: self.spot,
            contracts: vec![self.current.clone()],
        }))
    }

    async fn fetch_full_chain(
        &self,
        underlying: &str,
        _right: OptionRight,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Option<ChainSnapshot>, MarketDataError> {
        Ok(Some(ChainSnapshot {
            underlying: underlying.to_string(),
            underlying_price: self.spot,
            contracts: self.rollover_universe.clone(),
        }))
    }
}

struct FixtureHistory;

#[async_trait]
impl PriceHistoryPort for FixtureHistory {
    async fn fetch_daily_closes(
        &self,
        _underlying: &str,
        _lookback_days: u32,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        Ok((0..250)
            .map(|i| DailyClose {
                date: start + Days::new(i),
                close: dec!(95) + Decimal::from(i % 10),
            })
            .collect())
    }
}

struct FixtureEarnings {
    date: NaiveDate,
}

#[async_trait]
impl EarningsPort for FixtureEarnings {
    async fn fetch_next_earnings_date(
        &self,
        _underlying: &str,
    ) -> Result<NaiveDate, MarketDataError> {
        Ok(self.date)
    }
}

// =============================================================================
// Scenario
// =============================================================================

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn contract(strike: Decimal, dte: i64, bid: Decimal, ask: Decimal, itm: bool) -> ChainContract {
    ChainContract {
        strike,
        expiration: as_of() + Days::new(dte.unsigned_abs()),
        days_to_expiration: dte,
        bid,
        ask,
        delta: 0.30,
        gamma: 0.02,
        theta: -0.06,
        vega: 0.11,
        implied_vol: 0.40,
        open_interest: 250,
        in_the_money: itm,
    }
}

/// Current short call JD_250612C100: spot 100, mid 0.60, extrinsic 0.60
/// at or below the 1%-of-strike floor, so action is needed.
fn fixture_chain() -> Arc<FixtureChain> {
    Arc::new(FixtureChain {
        spot: dec!(100),
        current: contract(dec!(100), 10, dec!(0.55), dec!(0.65), false),
        rollover_universe: vec![
            // Too close to spot for either tier.
            contract(dec!(100.5), 20, dec!(0.80), dec!(0.90), false),
            // The viable rollover target.
            contract(dec!(110), 20, dec!(1.10), dec!(1.20), false),
            // ITM, never a rollover target.
            contract(dec!(95), 30, dec!(6.00), dec!(6.30), true),
        ],
    })
}

fn fixture_sources() -> Vec<Arc<dyn PositionSource>> {
    vec![
        Arc::new(FixtureSource {
            name: "broker-a",
            positions: vec![
                Position::new("JD_250612C100", InstrumentType::Option, dec!(-2)),
                Position::new("JD", InstrumentType::Stock, dec!(100)),
                Position::new("BrokerA", InstrumentType::Cash, dec!(1000)),
            ],
            fail: false,
        }),
        Arc::new(FixtureSource {
            name: "broker-b",
            positions: vec![
                Position::new("JD_250612C100", InstrumentType::Option, dec!(-1)),
                // Already expired, dropped during enrichment.
                Position::new("JD_250530C90", InstrumentType::Option, dec!(-1)),
                Position::new("BrokerB", InstrumentType::Cash, dec!(500)),
            ],
            fail: false,
        }),
        Arc::new(FixtureSource {
            name: "broker-down",
            positions: vec![],
            fail: true,
        }),
    ]
}

fn enricher(chain: Arc<FixtureChain>) -> OptionEnricher {
    OptionEnricher::new(
        chain,
        Arc::new(FixtureHistory),
        Arc::new(FixtureEarnings {
            date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        }),
        EnrichmentConfig::default(),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_pipeline_produces_report_with_rollover() {
    let chain = fixture_chain();
    let portfolio = load_portfolio(&fixture_sources(), &enricher(chain.clone()), as_of()).await;

    // Same option across sources aggregates; expired one is dropped; the
    // failing source is isolated.
    assert_eq!(portfolio.len(), 4);
    let option = portfolio
        .of_type(InstrumentType::Option)
        .next()
        .expect("option position");
    assert_eq!(option.symbol, "JD_250612C100");
    assert_eq!(option.quantity, dec!(-3));

    let analytics = option.analytics.as_ref().expect("analytics attached");
    assert_eq!(analytics.mid_price, dec!(0.60));
    assert_eq!(analytics.intrinsic, Decimal::ZERO);
    assert_eq!(analytics.extrinsic, dec!(0.60));
    assert!(analytics.action_needed, "extrinsic at 0.6% of strike");
    assert_eq!(analytics.days_to_earnings, 10);

    let engine = RolloverEngine::new(chain, RolloverConfig::default());
    let report = ReportBuilder::new(
        engine,
        Arc::new(FixtureEarnings {
            date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        }),
    )
    .build(&portfolio, as_of())
    .await;

    assert_eq!(report.options.len(), 1);
    let row = &report.options[0];
    assert_eq!(row.symbol, "JD");
    assert!(row.action_needed);

    // The strict tier must pick the strike-110 call.
    let rollover = row.rollover.as_ref().expect("rollover recommendation");
    assert_eq!(rollover.strike, dec!(110));
    assert_eq!(rollover.mid_price, dec!(1.15));
    assert_eq!(rollover.net_credit, dec!(0.55));
    assert_eq!(rollover.intrinsic, Decimal::ZERO);
    assert_eq!(row.roll_to.as_deref(), Some("250622C110"));

    // Stocks, cash, and exposure aggregate across sources.
    assert_eq!(report.stocks.len(), 1);
    assert_eq!(report.cash.len(), 2);
    assert_eq!(report.cash_total, dec!(1500));

    assert_eq!(report.exposure.len(), 1);
    let exposure = &report.exposure[0];
    assert_eq!(exposure.symbol, "JD");
    // Short 3 calls at delta 0.30 (-90) against 100 shares (+100).
    assert_eq!(exposure.delta, 10);
    // -3 short calls + one stock lot.
    assert_eq!(exposure.covered_call_capability, -2);
}

#[tokio::test]
async fn long_flagged_position_gets_no_rollover() {
    let chain = fixture_chain();
    let source: Vec<Arc<dyn PositionSource>> = vec![Arc::new(FixtureSource {
        name: "broker-a",
        positions: vec![Position::new(
            "JD_250612C100",
            InstrumentType::Option,
            dec!(2),
        )],
        fail: false,
    })];

    let portfolio = load_portfolio(&source, &enricher(chain.clone()), as_of()).await;
    let report = ReportBuilder::new(
        RolloverEngine::new(chain, RolloverConfig::default()),
        Arc::new(FixtureEarnings {
            date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        }),
    )
    .build(&portfolio, as_of())
    .await;

    let row = &report.options[0];
    assert!(row.action_needed, "flag still reported for long positions");
    assert!(row.rollover.is_none(), "rollovers only apply to shorts");
    // Long positions report APR as a cost (negative).
    assert!(row.apr_pct < 0);
}

#[tokio::test]
async fn all_candidates_filtered_means_no_recommendation_not_error() {
    let chain = Arc::new(FixtureChain {
        spot: dec!(100),
        current: contract(dec!(100), 10, dec!(0.55), dec!(0.65), false),
        rollover_universe: vec![
            contract(dec!(100.5), 20, dec!(0.80), dec!(0.90), false),
            contract(dec!(95), 30, dec!(6.00), dec!(6.30), true),
        ],
    });
    let source: Vec<Arc<dyn PositionSource>> = vec![Arc::new(FixtureSource {
        name: "broker-a",
        positions: vec![Position::new(
            "JD_250612C100",
            InstrumentType::Option,
            dec!(-2),
        )],
        fail: false,
    })];

    let portfolio = load_portfolio(&source, &enricher(chain.clone()), as_of()).await;
    let report = ReportBuilder::new(
        RolloverEngine::new(chain, RolloverConfig::default()),
        Arc::new(FixtureEarnings {
            date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        }),
    )
    .build(&portfolio, as_of())
    .await;

    let row = &report.options[0];
    assert!(row.action_needed);
    assert!(row.rollover.is_none());
    assert!(row.roll_to.is_none());
}
