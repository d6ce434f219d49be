//! Map-ready features and the summary panel statistics

use super::{LocationRecord, WeatherSample, format_reading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A location merged with its weather sample, keyed by a per-cycle ordinal
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedFeature {
    /// Dense 1..N key for the rendering collaborator. Not stable across cycles.
    pub ordinal: u32,
    pub location: LocationRecord,
    pub weather: WeatherSample,
}

impl EnrichedFeature {
    /// GeoJSON point feature with flat attribute properties.
    /// A record without coordinates gets a null geometry.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let geometry = match self.location.coordinates() {
            Some((lat, lon)) => json!({"type": "Point", "coordinates": [lon, lat]}),
            None => Value::Null,
        };
        json!({
            "type": "Feature",
            "id": self.ordinal,
            "geometry": geometry,
            "properties": {
                "ObjectID": self.ordinal,
                "id": self.location.id,
                "name": self.location.name,
                "category": self.location.category,
                "cluster": self.location.cluster,
                "temperature": self.weather.temperature,
                "precipitation": self.weather.precipitation,
                "observed_at": self.weather.observed_at,
            }
        })
    }
}

/// Summary panel statistics. `None` means unavailable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FeatureSummary {
    pub count: usize,
    pub mean_temperature: Option<f64>,
    pub mean_precipitation: Option<f64>,
}

impl FeatureSummary {
    /// Mean temperature rounded to one decimal place
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format_reading(self.mean_temperature, "°C")
    }

    /// Mean precipitation rounded to one decimal place
    #[must_use]
    pub fn format_precipitation(&self) -> String {
        format_reading(self.mean_precipitation, " mm")
    }

    /// Lines shown in the summary panel
    #[must_use]
    pub fn panel_lines(&self) -> Vec<String> {
        vec![
            format!("Artisans: {}", self.count),
            format!("Avg Temp: {}", self.format_temperature()),
            format!("Avg Precip: {}", self.format_precipitation()),
        ]
    }
}

/// Everything produced by one fetch cycle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeatureSet {
    pub features: Vec<EnrichedFeature>,
    pub summary: FeatureSummary,
    pub generated_at: DateTime<Utc>,
}

impl FeatureSet {
    /// An aborted or empty cycle
    #[must_use]
    pub fn empty() -> Self {
        Self {
            features: Vec::new(),
            summary: FeatureSummary::default(),
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// GeoJSON `FeatureCollection` consumed by the mapping widget
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(EnrichedFeature::to_geojson).collect::<Vec<_>>(),
        })
    }
}
