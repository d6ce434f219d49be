//! Data models for the artisan map feed
//!
//! This module contains the core domain models organized by concern:
//! - Location: artisan rows from the location backend
//! - Weather: current conditions attached to each row
//! - Feature: numbered map features and the summary panel

pub mod feature;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use feature::{EnrichedFeature, FeatureSet, FeatureSummary};
pub use location::LocationRecord;
pub use weather::WeatherSample;

use crate::presentation::UNAVAILABLE_TEXT;

/// One-decimal reading with its unit, or the unavailable marker
pub(crate) fn format_reading(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| UNAVAILABLE_TEXT.to_string(), |v| format!("{v:.1}{unit}"))
}
