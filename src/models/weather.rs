//! Current weather sample attached to each location

use serde::{Deserialize, Serialize};

use super::format_reading;

/// Current conditions at a location.
///
/// `None` means the lookup failed or the value was not reported, which is
/// distinct from a real zero reading.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct WeatherSample {
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Precipitation amount in mm
    pub precipitation: Option<f64>,
    /// Observation time as reported by the weather service
    pub observed_at: Option<String>,
}

impl WeatherSample {
    #[must_use]
    pub fn new(temperature: f64, precipitation: f64, observed_at: impl Into<String>) -> Self {
        Self {
            temperature: Some(temperature),
            precipitation: Some(precipitation),
            observed_at: Some(observed_at.into()),
        }
    }

    /// The all-null sample used when enrichment fails
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.temperature.is_none() && self.precipitation.is_none() && self.observed_at.is_none()
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format_reading(self.temperature, "°C")
    }

    /// Format precipitation with unit
    #[must_use]
    pub fn format_precipitation(&self) -> String {
        format_reading(self.precipitation, " mm")
    }
}
