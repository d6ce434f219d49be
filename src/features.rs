//! Feature assembly
//!
//! Numbers enriched records 1..N and computes the summary panel statistics.

use chrono::Utc;

use crate::models::{EnrichedFeature, FeatureSet, FeatureSummary, LocationRecord, WeatherSample};

/// Build one feature per enriched pair, in input order.
#[must_use]
pub fn assemble_features(enriched: Vec<(LocationRecord, WeatherSample)>) -> FeatureSet {
    let features: Vec<EnrichedFeature> = enriched
        .into_iter()
        .zip(1u32..)
        .map(|((location, weather), ordinal)| EnrichedFeature {
            ordinal,
            location,
            weather,
        })
        .collect();

    let summary = summarize(&features);
    FeatureSet {
        features,
        summary,
        generated_at: Utc::now(),
    }
}

/// Means over the non-null samples only
#[must_use]
pub fn summarize(features: &[EnrichedFeature]) -> FeatureSummary {
    FeatureSummary {
        count: features.len(),
        mean_temperature: mean(features.iter().filter_map(|f| f.weather.temperature)),
        mean_precipitation: mean(features.iter().filter_map(|f| f.weather.precipitation)),
    }
}

/// Arithmetic mean, `None` for an empty sequence
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}
