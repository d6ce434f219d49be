//! `artisan-map` - artisan locations with live weather overlays
//!
//! Fetches artisan locations from a backend procedure, attaches current
//! weather to each one, assembles numbered map features with summary
//! statistics and hands them to a mapping front-end together with a
//! declarative cluster or heatmap render configuration.

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod feed;
pub mod locations;
pub mod logging;
pub mod models;
pub mod presentation;
pub mod render;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::ArtisanMapConfig;
pub use error::ArtisanMapError;
pub use features::assemble_features;
pub use feed::{FeedHandle, LocationWeatherFeed, ModeCell};
pub use locations::{FileLocationSource, LocationSource, RpcLocationSource};
pub use models::{EnrichedFeature, FeatureSet, FeatureSummary, LocationRecord, WeatherSample};
pub use presentation::{PresentationMode, RenderConfig, configure_presentation};
pub use render::{FeatureRenderer, JsonFileRenderer, SnapshotRenderer};
pub use weather::{OpenMeteoClient, WeatherEnricher, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ArtisanMapError>;
