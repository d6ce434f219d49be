use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{LocationSource, parse_locations};
use crate::models::LocationRecord;
use crate::{ArtisanMapError, Result};

/// Reads artisan rows from a local JSON file with the backend's row shape
pub struct FileLocationSource {
    path: PathBuf,
}

impl FileLocationSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl LocationSource for FileLocationSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ArtisanMapError::location_source(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))
        })?;

        let rows = parse_locations(&body)?;
        info!("Loaded {} artisan locations from file", rows.len());
        Ok(rows)
    }
}
