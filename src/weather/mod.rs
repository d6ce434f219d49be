//! Weather enrichment
//!
//! Fans out one current-conditions lookup per location record and joins them
//! back in input order. A failed lookup degrades that record to
//! [`WeatherSample::unavailable`] and never affects its neighbours.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::{ArtisanMapError, Result};
use crate::models::{LocationRecord, WeatherSample};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Source of current weather conditions by coordinate
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherSample>;
}

/// Attaches a [`WeatherSample`] to every location record
pub struct WeatherEnricher {
    provider: Arc<dyn WeatherProvider>,
    max_concurrent: Option<usize>,
}

impl WeatherEnricher {
    /// Unbounded fan-out: one in-flight lookup per record
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            max_concurrent: None,
        }
    }

    /// Cap the number of lookups in flight at once
    #[must_use]
    pub fn with_max_concurrent(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent = limit.filter(|l| *l > 0);
        self
    }

    /// Enrich all records; output is index-aligned with the input.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn enrich(&self, records: Vec<LocationRecord>) -> Vec<(LocationRecord, WeatherSample)> {
        if records.is_empty() {
            debug!("No records to enrich");
            return Vec::new();
        }

        let total = records.len();
        let lookups = records.into_iter().map(|record| async move {
            let sample = self.lookup(&record).await;
            (record, sample)
        });

        let enriched: Vec<(LocationRecord, WeatherSample)> = match self.max_concurrent {
            Some(limit) => stream::iter(lookups).buffered(limit).collect().await,
            None => join_all(lookups).await,
        };

        let failed = enriched.iter().filter(|(_, s)| s.is_unavailable()).count();
        info!(
            "Enriched {} locations ({} without weather)",
            total, failed
        );
        enriched
    }

    async fn lookup(&self, record: &LocationRecord) -> WeatherSample {
        let outcome = match record.coordinates() {
            Some((lat, lon)) => self.provider.current_weather(lat, lon).await,
            None => Err(ArtisanMapError::weather("record has no coordinates")),
        };
        match outcome {
            Ok(sample) => sample,
            Err(err) => {
                warn!(
                    "Weather lookup failed for '{}' at ({}): {}",
                    record.name,
                    record.format_coordinates(),
                    err
                );
                WeatherSample::unavailable()
            }
        }
    }
}
