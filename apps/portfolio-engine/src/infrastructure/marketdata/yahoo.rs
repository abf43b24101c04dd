//! Yahoo Finance daily-close history adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{DailyClose, MarketDataError, PriceHistoryPort};

/// Yahoo chart API adapter implementing [`PriceHistoryPort`].
#[derive(Debug, Clone)]
pub struct YahooHistoryAdapter {
    client: reqwest::Client,
    base_url: String,
}

/// `GET /v8/finance/chart/{symbol}`.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooHistoryAdapter {
    /// Default public endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    /// Create an adapter against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Network`] when the HTTP client cannot be
    /// built.
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Create an adapter against a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Network`] when the HTTP client cannot be
    /// built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MarketDataError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PriceHistoryPort for YahooHistoryAdapter {
    async fn fetch_daily_closes(
        &self,
        underlying: &str,
        lookback_days: u32,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        let now = Utc::now().timestamp();
        let from = now - i64::from(lookback_days) * 86_400;
        let url = format!(
            "{}/v8/finance/chart/{underlying}?period1={from}&period2={now}&interval=1d",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::JsonParse(e.to_string()))?;
        let Some(result) = chart.chart.result.into_iter().next() else {
            return Ok(Vec::new());
        };
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Ok(Vec::new());
        };

        let closes = result
            .timestamp
            .iter()
            .zip(quote.close.iter())
            .filter_map(|(timestamp, close)| {
                let close = (*close)?;
                let date = DateTime::<Utc>::from_timestamp(*timestamp, 0)?.date_naive();
                let close = Decimal::try_from(close).ok()?;
                Some(DailyClose { date, close })
            })
            .collect();
        Ok(closes)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn closes_are_decoded_and_nulls_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/JD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": [{
                        "timestamp": [1748822400, 1748908800, 1748995200],
                        "indicators": {
                            "quote": [{"close": [100.5, null, 101.25]}]
                        }
                    }]
                }
            })))
            .mount(&server)
            .await;

        let adapter = YahooHistoryAdapter::with_base_url(server.uri()).unwrap();
        let closes = adapter.fetch_daily_closes("JD", 365).await.unwrap();

        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].close.to_string(), "100.5");
    }

    #[tokio::test]
    async fn non_2xx_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/JD"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let adapter = YahooHistoryAdapter::with_base_url(server.uri()).unwrap();
        let result = adapter.fetch_daily_closes("JD", 365).await;
        assert!(matches!(result, Err(MarketDataError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn empty_result_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/JD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"chart": {"result": []}})),
            )
            .mount(&server)
            .await;

        let adapter = YahooHistoryAdapter::with_base_url(server.uri()).unwrap();
        let closes = adapter.fetch_daily_closes("JD", 365).await.unwrap();
        assert!(closes.is_empty());
    }
}
