//! Finnhub earnings-calendar adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{EarningsPort, MarketDataError, far_future_earnings};

/// How far ahead to look for the next earnings date, days.
const LOOKAHEAD_DAYS: u64 = 100;

/// Finnhub earnings-calendar adapter implementing [`EarningsPort`].
#[derive(Debug, Clone)]
pub struct FinnhubEarningsAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// `GET /api/v1/calendar/earnings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsCalendarResponse {
    #[serde(default)]
    earnings_calendar: Vec<EarningsEntry>,
}

#[derive(Debug, Deserialize)]
struct EarningsEntry {
    date: String,
}

impl FinnhubEarningsAdapter {
    /// Default public endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://finnhub.io";

    /// Create an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::AuthenticationFailed`] when the API key
    /// is empty, aborting the run before any fetch.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MarketDataError> {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Create an adapter against a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::AuthenticationFailed`] when the API key
    /// is empty.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, MarketDataError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(MarketDataError::AuthenticationFailed);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MarketDataError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl EarningsPort for FinnhubEarningsAdapter {
    async fn fetch_next_earnings_date(
        &self,
        underlying: &str,
    ) -> Result<NaiveDate, MarketDataError> {
        // Window starts at yesterday so a same-day report still counts.
        let today = Utc::now().date_naive();
        let from = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let to = today.checked_add_days(Days::new(LOOKAHEAD_DAYS)).unwrap_or(today);
        let url = format!(
            "{}/api/v1/calendar/earnings?from={from}&to={to}&symbol={underlying}&token={}",
            self.base_url, self.api_key
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

        let calendar: EarningsCalendarResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::JsonParse(e.to_string()))?;

        let date = calendar
            .earnings_calendar
            .last()
            .and_then(|entry| NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").ok());
        match date {
            Some(date) => Ok(date),
            None => {
                debug!(underlying, "No upcoming earnings date, using sentinel");
                Ok(far_future_earnings())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            FinnhubEarningsAdapter::new(""),
            Err(MarketDataError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn last_calendar_entry_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calendar/earnings"))
            .and(query_param("symbol", "JD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "earningsCalendar": [
                    {"date": "2025-08-14"},
                    {"date": "2025-06-12"}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = FinnhubEarningsAdapter::with_base_url("key", server.uri()).unwrap();
        let date = adapter.fetch_next_earnings_date("JD").await.unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 12).unwrap());
    }

    #[tokio::test]
    async fn empty_calendar_returns_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calendar/earnings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"earningsCalendar": []})),
            )
            .mount(&server)
            .await;

        let adapter = FinnhubEarningsAdapter::with_base_url("key", server.uri()).unwrap();
        let date = adapter.fetch_next_earnings_date("JD").await.unwrap();
        assert_eq!(date, far_future_earnings());
    }
}
