//! Bearer-token HTTP client with retry logic.
//!
//! Shared by the brokerage adapters: GET-only JSON surface, exponential
//! backoff on network errors and retryable statuses, Retry-After support
//! on 429.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{BrokerError, MarketDataError};

/// Retry behavior for transient failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay, milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier per attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// Transport errors from the HTTP client.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Missing or empty access token.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error (retried up to the configured attempts).
    #[error("network error: {0}")]
    Network(String),

    /// API returned a non-2xx response.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body from the API.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Rate limited and out of retry budget.
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
}

impl From<HttpError> for BrokerError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::AuthenticationFailed => Self::AuthenticationFailed,
            HttpError::Network(message) => Self::Network(message),
            HttpError::Api { status, message } => Self::Api { status, message },
            HttpError::JsonParse(message) => Self::JsonParse(message),
            HttpError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            HttpError::MaxRetriesExceeded { attempts } => Self::MaxRetriesExceeded { attempts },
        }
    }
}

impl From<HttpError> for MarketDataError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::AuthenticationFailed => Self::AuthenticationFailed,
            HttpError::Network(message) => Self::Network(message),
            HttpError::Api { status, message } => Self::Api { status, message },
            HttpError::JsonParse(message) => Self::JsonParse(message),
            HttpError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            HttpError::MaxRetriesExceeded { attempts } => Self::MaxRetriesExceeded { attempts },
        }
    }
}

/// GET-only JSON client authenticated with a pre-obtained bearer token.
///
/// The token is supplied by the session; this client never refreshes it.
#[derive(Debug, Clone)]
pub struct BearerHttpClient {
    client: Client,
    access_token: String,
    retry: RetryConfig,
}

impl BearerHttpClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::AuthenticationFailed`] when the token is empty,
    /// so a misconfigured run aborts before any fetch.
    pub fn new(
        access_token: impl Into<String>,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, HttpError> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(HttpError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Network(e.to_string()))?;

        Ok(Self {
            client,
            access_token,
            retry,
        })
    }

    /// Make a GET request and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            let request = self
                .client
                .get(url)
                .header("Authorization", format!("Bearer {}", self.access_token));

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| HttpError::Network(e.to_string()))?;
                return serde_json::from_str(&text).map_err(|e| HttpError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = retry_after
                        .map(Duration::from_secs)
                        .or_else(|| backoff.next_backoff());
                    if let Some(delay) = delay {
                        tracing::warn!(delay_ms = delay.as_millis(), "Rate limited, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            status = status.as_u16(),
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(HttpError::AuthenticationFailed)
                        }
                        _ => Err(HttpError::Api {
                            status: status.as_u16(),
                            message: body,
                        }),
                    };
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: i64,
    }

    fn client(token: &str) -> BearerHttpClient {
        BearerHttpClient::new(
            token,
            Duration::from_secs(5),
            RetryConfig {
                max_attempts: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
                multiplier: 2.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn empty_token_is_rejected_before_any_fetch() {
        let result = BearerHttpClient::new("", Duration::from_secs(5), RetryConfig::default());
        assert!(matches!(result, Err(HttpError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn get_json_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 7})))
            .mount(&server)
            .await;

        let payload: Payload = client("token-1")
            .get_json(&format!("{}/data", server.uri()))
            .await
            .unwrap();
        assert_eq!(payload.value, 7);
    }

    #[tokio::test]
    async fn non_2xx_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = client("token-1")
            .get_json(&format!("{}/data", server.uri()))
            .await;
        assert!(matches!(result, Err(HttpError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = client("stale-token")
            .get_json(&format!("{}/data", server.uri()))
            .await;
        assert!(matches!(result, Err(HttpError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn server_errors_exhaust_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = client("token-1")
            .get_json(&format!("{}/data", server.uri()))
            .await;
        assert!(matches!(result, Err(HttpError::MaxRetriesExceeded { .. })));
    }

    #[test]
    fn exponential_backoff_increments_and_caps() {
        let mut backoff = ExponentialBackoff::new(&RetryConfig {
            max_attempts: 4,
            initial_backoff_ms: 100,
            max_backoff_ms: 300,
            multiplier: 2.0,
        });

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
        assert_eq!(backoff.next_backoff(), None);
    }
}
