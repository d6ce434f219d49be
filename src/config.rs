//! Configuration management for the artisan map feed
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ArtisanMapError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the artisan map feed
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArtisanMapConfig {
    /// Location backend (remote procedure) configuration
    pub backend: BackendConfig,
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Initial map view
    pub map: MapViewConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web server configuration
    pub server: ServerConfig,
}

/// Location backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the PostgREST-style backend
    pub base_url: String,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: Option<String>,
    /// Name of the remote procedure returning artisan locations
    pub procedure: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Upper bound on parallel lookups per fetch cycle (unbounded when unset)
    pub max_concurrent_requests: Option<usize>,
}

/// Initial map view handed to the front-end together with the render config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapViewConfig {
    /// Basemap identifier understood by the mapping widget
    pub basemap: String,
    /// View center as `[longitude, latitude]`
    pub center: [f64; 2],
    /// Initial zoom level
    pub zoom: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port
    pub port: u16,
    /// Directory with the static front-end bundle
    pub static_dir: String,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_backend_procedure() -> String {
    "get_artisan_locations".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_basemap() -> String {
    "topo-vector".to_string()
}

// Assam
fn default_center() -> [f64; 2] {
    [92.5, 26.0]
}

fn default_zoom() -> u8 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            api_key: None,
            procedure: default_backend_procedure(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            max_concurrent_requests: None,
        }
    }
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            basemap: default_basemap(),
            center: default_center(),
            zoom: default_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ArtisanMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ARTISANMAP_WEATHER__BASE_URL and friends
        builder = builder.add_source(
            Environment::with_prefix("ARTISANMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ArtisanMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("artisan-map").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.procedure.is_empty() {
            self.backend.procedure = default_backend_procedure();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.map.basemap.is_empty() {
            self.map.basemap = default_basemap();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate backend credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.backend.api_key {
            if api_key.is_empty() {
                return Err(ArtisanMapError::config(
                    "Backend API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 || self.backend.timeout_seconds > 300 {
            return Err(ArtisanMapError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_concurrent_requests == Some(0) {
            return Err(ArtisanMapError::config(
                "Weather max concurrent requests must be at least 1 when set",
            )
            .into());
        }

        let [lon, lat] = self.map.center;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(ArtisanMapError::config(format!(
                "Map center [{lon}, {lat}] is outside valid longitude/latitude ranges"
            ))
            .into());
        }

        if self.map.zoom > 23 {
            return Err(ArtisanMapError::config("Map zoom cannot exceed 23").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ArtisanMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ArtisanMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Backend", &self.backend.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ArtisanMapError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
