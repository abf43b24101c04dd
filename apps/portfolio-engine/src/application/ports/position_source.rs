//! Position Source Port (Driven Port)
//!
//! Interface for fetching already-normalized positions from a brokerage.
//! One implementation per brokerage; the aggregation pipeline depends on
//! this abstraction rather than concrete adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Position;

/// Transport-level errors from a brokerage source.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// API returned a non-2xx response.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or message from the API.
        message: String,
    },

    /// Missing or malformed credentials; the run must abort before any fetch.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error (retryable).
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Max retries exceeded.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Source-local input problem (e.g. an unreadable export row file).
    #[error("source input error: {0}")]
    Input(String),
}

/// Port for fetching positions from one brokerage.
///
/// Implementations return positions already normalized to
/// CASH/STOCK/OPTION with unified option symbols. Rows that fail symbol
/// normalization are kept as STOCK rather than dropped; recognized
/// non-security rows are skipped.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Human-readable source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch all positions from this source.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the source cannot be reached or returns
    /// a non-2xx response.
    async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError>;
}
