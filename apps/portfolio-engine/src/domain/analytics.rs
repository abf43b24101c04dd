//! Derived analytics attached to enriched option positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::OptionRight;

/// Intrinsic value of an option given the underlying spot price.
///
/// `max(spot − strike, 0)` for calls, `max(strike − spot, 0)` for puts.
#[must_use]
pub fn intrinsic_value(right: OptionRight, underlying_price: Decimal, strike: Decimal) -> Decimal {
    let raw = match right {
        OptionRight::Call => underlying_price - strike,
        OptionRight::Put => strike - underlying_price,
    };
    raw.max(Decimal::ZERO)
}

/// Market data and derived metrics for one option position.
///
/// Attached to an OPTION position by enrichment; money amounts are per-share
/// (contract multiplier not applied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionAnalytics {
    /// Underlying spot price.
    pub underlying_price: Decimal,
    /// Option mid price, `(bid + ask) / 2`.
    pub mid_price: Decimal,
    /// Days to expiration.
    pub days_to_expiration: i64,
    /// Intrinsic value.
    pub intrinsic: Decimal,
    /// Extrinsic (time) value, `mid − intrinsic`.
    pub extrinsic: Decimal,
    /// Whether the chain marks the contract in-the-money.
    pub in_the_money: bool,
    /// Whether the position needs action (assignment risk or exhausted
    /// time value).
    pub action_needed: bool,
    /// Days until the next known earnings date.
    pub days_to_earnings: i64,
    /// Delta.
    pub delta: f64,
    /// Gamma.
    pub gamma: f64,
    /// Theta.
    pub theta: f64,
    /// Vega.
    pub vega: f64,
    /// Open interest.
    pub open_interest: i64,
    /// Implied volatility.
    pub implied_vol: f64,
    /// Historical volatility of the underlying (sample std-dev of trailing
    /// one-year daily closes).
    pub underlying_volatility: f64,
    /// Strike distance from spot in historical-volatility units.
    pub x_std: f64,
}

impl OptionAnalytics {
    /// Strike distance in volatility units, reported negative when the
    /// contract is in-the-money (display convention).
    #[must_use]
    pub fn signed_x_std(&self) -> f64 {
        if self.in_the_money { -self.x_std } else { self.x_std }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn intrinsic_call_above_strike() {
        assert_eq!(
            intrinsic_value(OptionRight::Call, dec!(110), dec!(100)),
            dec!(10)
        );
    }

    #[test]
    fn intrinsic_call_below_strike_is_zero() {
        assert_eq!(
            intrinsic_value(OptionRight::Call, dec!(90), dec!(100)),
            Decimal::ZERO
        );
    }

    #[test]
    fn intrinsic_put_below_strike() {
        assert_eq!(
            intrinsic_value(OptionRight::Put, dec!(90), dec!(100)),
            dec!(10)
        );
    }

    #[test]
    fn intrinsic_put_above_strike_is_zero() {
        assert_eq!(
            intrinsic_value(OptionRight::Put, dec!(110), dec!(100)),
            Decimal::ZERO
        );
    }

    #[test]
    fn signed_x_std_flips_when_itm() {
        let mut analytics = OptionAnalytics {
            underlying_price: dec!(100),
            mid_price: dec!(1.5),
            days_to_expiration: 10,
            intrinsic: Decimal::ZERO,
            extrinsic: dec!(1.5),
            in_the_money: false,
            action_needed: false,
            days_to_earnings: 30,
            delta: 0.3,
            gamma: 0.01,
            theta: -0.05,
            vega: 0.1,
            open_interest: 500,
            implied_vol: 0.4,
            underlying_volatility: 12.5,
            x_std: 0.8,
        };

        assert!(analytics.signed_x_std() > 0.0);
        analytics.in_the_money = true;
        assert!(analytics.signed_x_std() < 0.0);
    }
}
