//! Weather Client — forecast lookups against an OpenWeatherMap-style API.
//!
//! The provider's dynamic JSON is validated into typed schema structs at
//! this boundary. Transport errors, non-200 statuses, and schema-invalid
//! bodies all map to [`WeatherError`] so callers can apply the
//! default-fallback policy instead of handling raw HTTP errors.

use crate::config::defaults::FORECAST_WINDOW;
use crate::config::WeatherConfig;
use crate::types::ForecastPoint;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

/// Weather client errors. All variants mean "forecast unavailable".
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed provider response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Provider returned unrepresentable timestamp {0}")]
    InvalidTimestamp(i64),
}

// ============================================================================
// Provider Schema
// ============================================================================

/// Top-level forecast response: `{ "list": [ ... ] }`
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

/// One `list` entry: `{ "dt": ..., "main": { "temp": ..., "humidity": ... } }`
#[derive(Debug, Deserialize)]
struct ForecastEntry {
    /// Unix timestamp of the forecast slot.
    dt: i64,
    main: ForecastMain,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
    humidity: f64,
}

/// Convert the provider payload into the forecast window callers consume.
fn to_forecast_points(response: ForecastResponse) -> Result<Vec<ForecastPoint>, WeatherError> {
    response
        .list
        .into_iter()
        .take(FORECAST_WINDOW)
        .map(|entry| {
            let timestamp = DateTime::from_timestamp(entry.dt, 0)
                .ok_or(WeatherError::InvalidTimestamp(entry.dt))?
                .format("%Y-%m-%d %H:%M")
                .to_string();
            Ok(ForecastPoint {
                timestamp,
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
            })
        })
        .collect()
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the forecast provider.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a client from config. The request timeout is fixed at
    /// construction; a slow provider fails into the fallback path rather
    /// than blocking an interaction indefinitely.
    pub fn new(config: &WeatherConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
        }
    }

    /// Fetch the forecast window for a city.
    ///
    /// Returns at most [`FORECAST_WINDOW`] entries in provider order.
    pub async fn forecast(&self, city: &str) -> Result<Vec<ForecastPoint>, WeatherError> {
        let resp = self
            .http
            .get(format!("{}/forecast", self.base_url))
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%city, %status, "Forecast request rejected by provider");
            return Err(WeatherError::Status(status));
        }

        let body = resp.bytes().await?;
        let response: ForecastResponse = serde_json::from_slice(&body)?;
        to_forecast_points(response)
    }
}
