//! Configuration module for the portfolio engine.
//!
//! Loads YAML configuration with per-field defaults, injects credentials
//! from environment variables, and validates them before any fetch is
//! attempted.
//!
//! # Usage
//!
//! ```rust,ignore
//! use portfolio_engine::config::load_config;
//!
//! // Load from default path (config.yaml), falling back to defaults
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some(Path::new("custom/config.yaml")))?;
//! ```

mod brokers;
mod market_data;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brokers::{BrokersConfig, ExportRowsConfig};
pub use market_data::MarketDataConfig;

use crate::application::services::EnrichmentConfig;
use crate::observability::LoggingConfig;
use crate::rollover::RolloverConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// A required credential is missing or empty.
    #[error("missing required credential: {0}")]
    MissingCredential(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Brokerage sources.
    #[serde(default)]
    pub brokers: BrokersConfig,
    /// Market data providers.
    #[serde(default)]
    pub market_data: MarketDataConfig,
    /// Enrichment thresholds.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Rollover search tiers and score references.
    #[serde(default)]
    pub rollover: RolloverConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Load configuration.
///
/// With `None`, reads [`DEFAULT_CONFIG_PATH`] when present and falls back
/// to defaults otherwise; an explicit path must exist. Credentials are
/// then injected from environment variables.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                parse_file(default)?
            } else {
                Config::default()
            }
        }
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_yaml_bw::from_str(&raw)?)
}

/// Inject credentials from the environment, overriding file values.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = std::env::var("SCHWAB_ACCESS_TOKEN") {
        config.brokers.schwab.access_token = token;
    }
    if let Ok(token) = std::env::var("TRADESTATION_ACCESS_TOKEN") {
        config.brokers.tradestation.access_token = token;
    }
    if let Ok(account) = std::env::var("TRADESTATION_ACCOUNT_ID") {
        config.brokers.tradestation.account_id = account;
    }
    if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
        config.market_data.finnhub_api_key = key;
    }
}

/// Validate that every credential the enabled sources need is present.
///
/// Called before any fetch; a missing credential aborts the run.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredential`] naming the first missing
/// credential.
pub fn require_credentials(config: &Config) -> Result<(), ConfigError> {
    // Schwab doubles as the chain provider, so its token is always needed.
    if config.brokers.schwab.access_token.is_empty() {
        return Err(ConfigError::MissingCredential("SCHWAB_ACCESS_TOKEN"));
    }
    if config.brokers.tradestation.enabled {
        if config.brokers.tradestation.access_token.is_empty() {
            return Err(ConfigError::MissingCredential("TRADESTATION_ACCESS_TOKEN"));
        }
        if config.brokers.tradestation.account_id.is_empty() {
            return Err(ConfigError::MissingCredential("TRADESTATION_ACCOUNT_ID"));
        }
    }
    if config.market_data.finnhub_api_key.is_empty() {
        return Err(ConfigError::MissingCredential("FINNHUB_API_KEY"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let config = Config::default();
        assert!(config.brokers.schwab.enabled);
        assert!(!config.brokers.tradestation.enabled);
        assert_eq!(config.rollover.tiers.len(), 2);
        assert_eq!(config.enrichment.itm_dte_threshold, 5);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "brokers:\n  schwab:\n    access_token: file-token\nenrichment:\n  itm_dte_threshold: 7\n"
        )
        .unwrap();

        let config = parse_file(file.path()).unwrap();
        assert_eq!(config.brokers.schwab.access_token, "file-token");
        assert_eq!(config.enrichment.itm_dte_threshold, 7);
        // Untouched sections keep defaults.
        assert_eq!(config.rollover.tiers.len(), 2);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "brokers: [not, a, map]").unwrap();

        assert!(matches!(
            parse_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        assert!(matches!(
            parse_file(Path::new("/nonexistent/config.yaml")),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn credentials_are_required_before_any_fetch() {
        let mut config = Config::default();
        assert!(matches!(
            require_credentials(&config),
            Err(ConfigError::MissingCredential("SCHWAB_ACCESS_TOKEN"))
        ));

        config.brokers.schwab.access_token = "token".to_string();
        assert!(matches!(
            require_credentials(&config),
            Err(ConfigError::MissingCredential("FINNHUB_API_KEY"))
        ));

        config.market_data.finnhub_api_key = "key".to_string();
        assert!(require_credentials(&config).is_ok());

        config.brokers.tradestation.enabled = true;
        assert!(matches!(
            require_credentials(&config),
            Err(ConfigError::MissingCredential("TRADESTATION_ACCESS_TOKEN"))
        ));
    }
}
