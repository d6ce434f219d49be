//! Artisan location record as delivered by the location backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single artisan location row
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationRecord {
    /// Opaque backend identity (numeric ids are stringified)
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Craft or category label
    #[serde(alias = "craft", default)]
    pub category: String,
    /// Cluster/group label
    #[serde(alias = "cluster_name", default)]
    pub cluster: String,
    /// Latitude in decimal degrees. Rows may arrive without one.
    #[serde(alias = "lat", default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(alias = "lng", alias = "lon", default)]
    pub longitude: Option<f64>,
}

impl LocationRecord {
    /// Create a new location record
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        cluster: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            cluster: cluster.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// `(latitude, longitude)` when both are present
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        match self.coordinates() {
            Some((lat, lon)) => format!("{lat:.4}, {lon:.4}"),
            None => "unknown position".to_string(),
        }
    }
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
