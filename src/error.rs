//! Error types and handling for the artisan map feed

use thiserror::Error;

/// Main error type for the artisan map feed
#[derive(Error, Debug)]
pub enum ArtisanMapError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Location backend errors (aborts a whole fetch cycle)
    #[error("Location source error: {message}")]
    LocationSource { message: String },

    /// Weather service errors (isolated to a single record)
    #[error("Weather error: {message}")]
    Weather { message: String },

    /// Malformed payloads from either remote collaborator
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Rendering collaborator errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// The fetch cycle was aborted by teardown
    #[error("Fetch cycle cancelled")]
    Cancelled,

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ArtisanMapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new location source error
    pub fn location_source<S: Into<String>>(message: S) -> Self {
        Self::LocationSource {
            message: message.into(),
        }
    }

    /// Create a new weather error
    pub fn weather<S: Into<String>>(message: S) -> Self {
        Self::Weather {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ArtisanMapError::Config { .. } => {
                "Configuration error. Please check your config file and backend keys.".to_string()
            }
            ArtisanMapError::LocationSource { .. } => {
                "Unable to load artisan locations. The map will be empty.".to_string()
            }
            ArtisanMapError::Weather { .. } => {
                "Weather data is currently unavailable for this location.".to_string()
            }
            ArtisanMapError::Parse { message } => {
                format!("Unexpected data received: {message}")
            }
            ArtisanMapError::Render { message } => message.clone(),
            ArtisanMapError::Cancelled => "The map was closed before loading finished.".to_string(),
            ArtisanMapError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for ArtisanMapError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
