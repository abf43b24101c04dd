//! Canonical option symbol value object and per-brokerage normalization.
//!
//! Every brokerage encodes option identifiers differently; the rest of the
//! engine only ever sees the unified format
//! `UNDERLYING[DIGITS]_YYMMDD{C|P}STRIKE` (e.g. `JD_240524C32.5`,
//! `LGF1_250620P8`). Parsers here use anchored regexes with named capture
//! groups and rescale strikes to a canonical decimal.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionRight {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionRight {
    /// Single-letter marker used in symbol encodings.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Errors from option symbol normalization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The source string did not match the expected encoding pattern.
    #[error("symbol '{symbol}' does not match the {encoding} pattern")]
    PatternMismatch {
        /// The raw source string.
        symbol: String,
        /// Name of the encoding that was attempted.
        encoding: &'static str,
    },

    /// The expiration field was not a valid YYMMDD date.
    #[error("invalid expiration '{0}'")]
    InvalidExpiration(String),

    /// The strike field was not a valid decimal.
    #[error("invalid strike '{0}'")]
    InvalidStrike(String),
}

#[allow(clippy::expect_used)]
static UNIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<underlying>[A-Za-z]+)(?P<class>\d*)_(?P<exp>\d{6})(?P<right>[CP])(?P<strike>\d+\.?\d*)$",
    )
    .expect("valid pattern")
});

#[allow(clippy::expect_used)]
static API_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<underlying>[A-Za-z]+)(?P<class>\d*)\s+(?P<exp>\d{6})(?P<right>[CP])(?P<strike>\d+\.?\d*)$",
    )
    .expect("valid pattern")
});

#[allow(clippy::expect_used)]
static IB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<underlying>[A-Z]+).*\[(?P<root>[A-Z]+)\s+(?P<exp>\d{6})(?P<right>[CP])(?P<strike>\d{8})\s+\d+\]$",
    )
    .expect("valid pattern")
});

#[allow(clippy::expect_used)]
static FIDELITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[^A-Za-z]*(?P<underlying>[A-Za-z]+)(?P<exp>\d{6})(?P<right>[CP])(?P<strike>\d+\.?\d*)$",
    )
    .expect("valid pattern")
});

/// Canonical option symbol.
///
/// Round-trips losslessly through the unified string format via
/// [`FromStr`] and [`fmt::Display`]. Strike precision is preserved to at
/// least two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionSymbol {
    /// Underlying ticker.
    underlying: String,
    /// Optional numeric disambiguator for multi-class tickers.
    class: Option<String>,
    /// Expiration date.
    expiration: NaiveDate,
    /// Call or put.
    right: OptionRight,
    /// Strike price, canonical decimal.
    strike: Decimal,
}

impl OptionSymbol {
    /// Create a symbol from parts.
    #[must_use]
    pub fn new(
        underlying: impl Into<String>,
        expiration: NaiveDate,
        right: OptionRight,
        strike: Decimal,
    ) -> Self {
        Self {
            underlying: underlying.into(),
            class: None,
            expiration,
            right,
            strike: strike.normalize(),
        }
    }

    /// Attach a numeric class disambiguator (multi-class tickers).
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.class = if class.is_empty() { None } else { Some(class) };
        self
    }

    /// Underlying ticker.
    #[must_use]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// Numeric disambiguator, if any.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Expiration date.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Call or put.
    #[must_use]
    pub const fn right(&self) -> OptionRight {
        self.right
    }

    /// Strike price.
    #[must_use]
    pub const fn strike(&self) -> Decimal {
        self.strike
    }

    /// Whether the contract has expired.
    ///
    /// A contract stays live through its expiration day.
    #[must_use]
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        self.expiration < as_of
    }

    /// Parse a Schwab/TradeStation API position symbol
    /// (`JD    240524C32000`, strike encoded x1000).
    pub fn parse_api_format(symbol: &str) -> Result<Self, SymbolError> {
        let caps = API_RE
            .captures(symbol.trim_end())
            .ok_or_else(|| SymbolError::PatternMismatch {
                symbol: symbol.to_string(),
                encoding: "broker API",
            })?;

        let strike = parse_strike(&caps["strike"])? / dec!(1000);
        Ok(
            Self::new(&caps["underlying"], parse_yymmdd(&caps["exp"])?, parse_right(&caps["right"]), strike.round_dp(2))
                .with_class(&caps["class"]),
        )
    }

    /// Parse an Interactive Brokers CSV instrument description
    /// (`JD JUN2024 32 C [JD 240524C00032000 100]`, strike x1000 as an
    /// 8-digit integer).
    pub fn parse_ib_description(description: &str) -> Result<Self, SymbolError> {
        let caps =
            IB_RE
                .captures(description.trim())
                .ok_or_else(|| SymbolError::PatternMismatch {
                    symbol: description.to_string(),
                    encoding: "IB description",
                })?;

        // The bracketed contract root must repeat the leading ticker.
        if caps["underlying"] != caps["root"] {
            return Err(SymbolError::PatternMismatch {
                symbol: description.to_string(),
                encoding: "IB description",
            });
        }

        let strike = (parse_strike(&caps["strike"])? / dec!(1000)).round_dp(2);
        Ok(Self::new(
            &caps["underlying"],
            parse_yymmdd(&caps["exp"])?,
            parse_right(&caps["right"]),
            strike,
        ))
    }

    /// Parse a Fidelity CSV option symbol (`-JD240524C32.5`, plain decimal
    /// strike, leading `-` marking a short position).
    pub fn parse_fidelity(symbol: &str) -> Result<Self, SymbolError> {
        let caps =
            FIDELITY_RE
                .captures(symbol.trim())
                .ok_or_else(|| SymbolError::PatternMismatch {
                    symbol: symbol.to_string(),
                    encoding: "Fidelity",
                })?;

        Ok(Self::new(
            &caps["underlying"],
            parse_yymmdd(&caps["exp"])?,
            parse_right(&caps["right"]),
            parse_strike(&caps["strike"])?,
        ))
    }

    /// Encode into the Schwab market-data wire format
    /// (`JD    240524C00032000`: underlying left-padded to 6 columns,
    /// strike x1000 zero-padded to 8 digits).
    #[must_use]
    pub fn to_wire_symbol(&self) -> String {
        let root = match &self.class {
            Some(class) => format!("{}{}", self.underlying, class),
            None => self.underlying.clone(),
        };
        let strike_millis = (self.strike * dec!(1000)).round();
        format!(
            "{root:<6}{}{}{strike_millis:0>8}",
            self.expiration.format("%y%m%d"),
            self.right.marker(),
        )
    }
}

impl FromStr for OptionSymbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = UNIFIED_RE
            .captures(s)
            .ok_or_else(|| SymbolError::PatternMismatch {
                symbol: s.to_string(),
                encoding: "unified",
            })?;

        Ok(
            Self::new(&caps["underlying"], parse_yymmdd(&caps["exp"])?, parse_right(&caps["right"]), parse_strike(&caps["strike"])?)
                .with_class(&caps["class"]),
        )
    }
}

impl fmt::Display for OptionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}_{}{}{}",
            self.underlying,
            self.class.as_deref().unwrap_or(""),
            self.expiration.format("%y%m%d"),
            self.right.marker(),
            self.strike.normalize(),
        )
    }
}

fn parse_right(marker: &str) -> OptionRight {
    // Capture group admits only C or P.
    if marker == "C" {
        OptionRight::Call
    } else {
        OptionRight::Put
    }
}

fn parse_yymmdd(exp: &str) -> Result<NaiveDate, SymbolError> {
    NaiveDate::parse_from_str(exp, "%y%m%d")
        .map_err(|_| SymbolError::InvalidExpiration(exp.to_string()))
}

fn parse_strike(raw: &str) -> Result<Decimal, SymbolError> {
    Decimal::from_str(raw).map_err(|_| SymbolError::InvalidStrike(raw.to_string()))
}
