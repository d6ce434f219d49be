//! Rendering collaborators
//!
//! A renderer receives the assembled features once per fetch cycle and a
//! fresh [`RenderConfig`] on every mode change. Drawing, clustering and heatmap
//! interpolation happen in the mapping widget on the other side.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::models::{FeatureSet, FeatureSummary};
use crate::presentation::{PresentationMode, RenderConfig, configure_presentation};
use crate::{ArtisanMapError, Result};

pub trait FeatureRenderer: Send + Sync {
    /// Replace the rendered feature set and its styling
    fn render_features(&mut self, features: &FeatureSet, config: &RenderConfig) -> Result<()>;

    /// Restyle the current features without replacing them
    fn apply_config(&mut self, config: &RenderConfig) -> Result<()>;

    /// Release everything held on behalf of the map view
    fn release(&mut self) -> Result<()>;
}

/// Latest state handed to the mapping widget
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub features: Value,
    pub summary: FeatureSummary,
    pub config: RenderConfig,
    pub released: bool,
}

impl Default for RenderSnapshot {
    fn default() -> Self {
        Self {
            features: FeatureSet::empty().to_geojson(),
            summary: FeatureSummary::default(),
            config: configure_presentation(PresentationMode::default()),
            released: false,
        }
    }
}

/// Keeps the latest snapshot in shared memory for the web API to serve
#[derive(Debug, Clone, Default)]
pub struct SnapshotRenderer {
    state: Arc<RwLock<RenderSnapshot>>,
}

impl SnapshotRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut RenderSnapshot)) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl FeatureRenderer for SnapshotRenderer {
    fn render_features(&mut self, features: &FeatureSet, config: &RenderConfig) -> Result<()> {
        let geojson = features.to_geojson();
        self.update(|s| {
            s.features = geojson;
            s.summary = features.summary.clone();
            s.config = config.clone();
        });
        debug!("Snapshot updated with {} features", features.len());
        Ok(())
    }

    fn apply_config(&mut self, config: &RenderConfig) -> Result<()> {
        self.update(|s| s.config = config.clone());
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.update(|s| {
            s.features = FeatureSet::empty().to_geojson();
            s.summary = FeatureSummary::default();
            s.released = true;
        });
        info!("Snapshot renderer released");
        Ok(())
    }
}

/// Writes `features.geojson`, `render_config.json` and `summary.json`
pub struct JsonFileRenderer {
    dir: PathBuf,
}

impl JsonFileRenderer {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(value)?;
        fs::write(&path, body).map_err(|e| {
            ArtisanMapError::render(format!("Failed to write {}: {e}", path.display()))
        })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl FeatureRenderer for JsonFileRenderer {
    fn render_features(&mut self, features: &FeatureSet, config: &RenderConfig) -> Result<()> {
        self.write_json("features.geojson", &features.to_geojson())?;
        self.write_json("summary.json", &features.summary)?;
        self.apply_config(config)
    }

    fn apply_config(&mut self, config: &RenderConfig) -> Result<()> {
        self.write_json("render_config.json", config)
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assemble_features;
    use crate::models::{LocationRecord, WeatherSample};

    fn feature_set() -> FeatureSet {
        assemble_features(vec![(
            LocationRecord::new("1", "Sualkuchi Weavers", "Silk", "Kamrup", 26.17, 91.57),
            WeatherSample::new(28.0, 1.5, "2026-10-17T06:00"),
        )])
    }

    #[test]
    fn test_snapshot_tracks_features_and_config() {
        let mut renderer = SnapshotRenderer::new();
        let shared = renderer.clone();

        renderer
            .render_features(&feature_set(), &configure_presentation(PresentationMode::Cluster))
            .unwrap();
        renderer
            .apply_config(&configure_presentation(PresentationMode::Heatmap))
            .unwrap();

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.summary.count, 1);
        assert_eq!(snapshot.features["features"][0]["properties"]["name"], "Sualkuchi Weavers");
        assert_eq!(snapshot.config.mode(), PresentationMode::Heatmap);
    }

    #[test]
    fn test_snapshot_release_clears_features() {
        let mut renderer = SnapshotRenderer::new();
        renderer
            .render_features(&feature_set(), &configure_presentation(PresentationMode::Cluster))
            .unwrap();

        renderer.release().unwrap();

        let snapshot = renderer.snapshot();
        assert!(snapshot.released);
        assert_eq!(snapshot.summary.count, 0);
    }

    #[test]
    fn test_json_file_renderer_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = JsonFileRenderer::new(dir.path().join("out")).unwrap();

        renderer
            .render_features(&feature_set(), &configure_presentation(PresentationMode::Heatmap))
            .unwrap();

        let config: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("out/render_config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["type"], "heatmap");
        let features: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("out/features.geojson")).unwrap(),
        )
        .unwrap();
        assert_eq!(features["type"], "FeatureCollection");
        assert!(dir.path().join("out/summary.json").exists());
    }
}
