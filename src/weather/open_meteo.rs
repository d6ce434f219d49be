//! Open-Meteo current conditions client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::models::WeatherSample;
use crate::{ArtisanMapError, Result};

/// `current` block of a forecast response
#[derive(Debug, Deserialize)]
struct CurrentData {
    time: Option<String>,
    #[serde(rename = "temperature_2m")]
    temperature: Option<f64>,
    precipitation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentData>,
}

/// Error body returned for rejected requests, e.g. out-of-range coordinates
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: String,
}

/// Weather API client for Open-Meteo (no API key required)
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("artisan-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArtisanMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn current_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,precipitation",
            self.base_url, latitude, longitude
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherSample> {
        let url = self.current_url(latitude, longitude);
        debug!("Open-Meteo request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArtisanMapError::weather(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.reason)
                .unwrap_or(body);
            return Err(ArtisanMapError::weather(format!(
                "Open-Meteo returned {status}: {reason}"
            )));
        }

        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            ArtisanMapError::parse(format!("Failed to parse Open-Meteo response: {e}"))
        })?;

        let current = forecast.current.ok_or_else(|| {
            ArtisanMapError::parse("Open-Meteo response has no current conditions")
        })?;

        let elapsed = start_time.elapsed();
        if elapsed.as_secs() > 5 {
            warn!("Slow weather response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(WeatherSample {
            temperature: current.temperature,
            precipitation: current.precipitation,
            observed_at: current.time,
        })
    }
}
