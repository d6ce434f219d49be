//! Presentation mode and declarative render configuration
//!
//! The mapping widget owns clustering and heatmap interpolation; this module
//! only decides which parameters it receives for each mode.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ArtisanMapError;

/// RGBA color as understood by the mapping widget
pub type Rgba = [u8; 4];

/// Visualization applied to the current feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    #[default]
    Cluster,
    Heatmap,
}

impl PresentationMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            PresentationMode::Cluster => PresentationMode::Heatmap,
            PresentationMode::Heatmap => PresentationMode::Cluster,
        }
    }

    /// Label of the UI control selecting this mode
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PresentationMode::Cluster => "Cluster",
            PresentationMode::Heatmap => "Heatmap",
        }
    }
}

impl Display for PresentationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresentationMode::Cluster => write!(f, "cluster"),
            PresentationMode::Heatmap => write!(f, "heatmap"),
        }
    }
}

impl FromStr for PresentationMode {
    type Err = ArtisanMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" => Ok(PresentationMode::Cluster),
            "heatmap" => Ok(PresentationMode::Heatmap),
            other => Err(ArtisanMapError::config(format!(
                "Unknown presentation mode '{other}'. Must be one of: cluster, heatmap"
            ))),
        }
    }
}

/// Fixed-size point marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size_px: f32,
    pub color: Rgba,
    pub outline_color: Rgba,
    pub outline_width_px: f32,
}

/// Clustering aggregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub radius_px: u32,
    pub min_size_px: u32,
    pub max_size_px: u32,
    /// Popup for aggregated clusters (count based)
    pub popup: PopupTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub ratio: f32,
    pub color: Rgba,
}

/// Intensity surface parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStyle {
    pub color_stops: Vec<ColorStop>,
    pub radius_px: u32,
    pub max_density: f64,
    pub min_density: f64,
}

/// Popup with `{field}` placeholders resolved by the mapping widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupTemplate {
    pub title: String,
    pub content: Vec<PopupField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupField {
    pub label: String,
    pub field: String,
    /// Suffix appended to numeric values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Decimal places for numeric values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places: Option<u8>,
}

impl PopupField {
    fn text(label: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            unit: None,
            places: None,
        }
    }

    fn number(label: &str, field: &str, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            unit: Some(unit.to_string()),
            places: Some(1),
        }
    }
}

/// Text shown in popups and the summary panel when a reading is null
pub const UNAVAILABLE_TEXT: &str = "N/A";

/// Declarative rendering configuration for one presentation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderConfig {
    Cluster {
        marker: MarkerStyle,
        clustering: ClusterConfig,
        popup: PopupTemplate,
    },
    Heatmap {
        heatmap: HeatmapStyle,
        popup: PopupTemplate,
    },
}

impl RenderConfig {
    #[must_use]
    pub fn mode(&self) -> PresentationMode {
        match self {
            RenderConfig::Cluster { .. } => PresentationMode::Cluster,
            RenderConfig::Heatmap { .. } => PresentationMode::Heatmap,
        }
    }

    #[must_use]
    pub fn clustering(&self) -> Option<&ClusterConfig> {
        match self {
            RenderConfig::Cluster { clustering, .. } => Some(clustering),
            RenderConfig::Heatmap { .. } => None,
        }
    }
}

/// Rendering parameters for `mode`. Pure: the result depends on nothing else.
#[must_use]
pub fn configure_presentation(mode: PresentationMode) -> RenderConfig {
    match mode {
        PresentationMode::Cluster => RenderConfig::Cluster {
            marker: MarkerStyle {
                size_px: 8.0,
                color: [226, 119, 40, 255],
                outline_color: [255, 255, 255, 255],
                outline_width_px: 1.0,
            },
            clustering: ClusterConfig {
                radius_px: 100,
                min_size_px: 24,
                max_size_px: 60,
                popup: PopupTemplate {
                    title: "Artisan cluster".to_string(),
                    content: vec![PopupField::text(
                        "This cluster represents {cluster_count} artisans",
                        "cluster_count",
                    )],
                },
            },
            popup: feature_popup(),
        },
        PresentationMode::Heatmap => RenderConfig::Heatmap {
            heatmap: HeatmapStyle {
                color_stops: vec![
                    ColorStop { ratio: 0.0, color: [63, 40, 102, 0] },
                    ColorStop { ratio: 0.083, color: [72, 47, 128, 255] },
                    ColorStop { ratio: 0.25, color: [55, 95, 175, 255] },
                    ColorStop { ratio: 0.5, color: [68, 170, 130, 255] },
                    ColorStop { ratio: 0.75, color: [240, 200, 60, 255] },
                    ColorStop { ratio: 1.0, color: [235, 60, 40, 255] },
                ],
                radius_px: 18,
                max_density: 0.04,
                min_density: 0.0,
            },
            popup: feature_popup(),
        },
    }
}

fn feature_popup() -> PopupTemplate {
    PopupTemplate {
        title: "{name}".to_string(),
        content: vec![
            PopupField::text("Category", "category"),
            PopupField::text("Cluster", "cluster"),
            PopupField::number("Temperature", "temperature", "°C"),
            PopupField::number("Precipitation", "precipitation", "mm"),
            PopupField::text("Observed", "observed_at"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_initial_mode_is_cluster() {
        assert_eq!(PresentationMode::default(), PresentationMode::Cluster);
    }

    #[rstest]
    #[case(PresentationMode::Cluster)]
    #[case(PresentationMode::Heatmap)]
    fn test_toggle_is_symmetric(#[case] mode: PresentationMode) {
        assert_ne!(mode.toggled(), mode);
        assert_eq!(mode.toggled().toggled(), mode);
    }

    #[rstest]
    #[case(PresentationMode::Cluster)]
    #[case(PresentationMode::Heatmap)]
    fn test_configuration_is_history_independent(#[case] mode: PresentationMode) {
        let fresh = configure_presentation(mode);
        let _ = configure_presentation(mode.toggled());
        let after_toggle = configure_presentation(mode.toggled().toggled());
        assert_eq!(fresh, after_toggle);
        assert_eq!(fresh, configure_presentation(mode));
        assert_eq!(fresh.mode(), mode);
    }

    #[test]
    fn test_heatmap_disables_clustering() {
        assert!(configure_presentation(PresentationMode::Heatmap).clustering().is_none());
        let cluster = configure_presentation(PresentationMode::Cluster);
        assert_eq!(cluster.clustering().map(|c| c.radius_px), Some(100));
    }

    #[test]
    fn test_cluster_popup_is_count_based() {
        let config = configure_presentation(PresentationMode::Cluster);
        let clustering = config.clustering().unwrap();
        assert!(clustering.popup.content[0].label.contains("{cluster_count}"));
    }

    #[test]
    fn test_render_config_is_tagged() {
        let value = serde_json::to_value(configure_presentation(PresentationMode::Heatmap)).unwrap();
        assert_eq!(value["type"], "heatmap");
        assert_eq!(value["heatmap"]["color_stops"].as_array().map(Vec::len), Some(6));
        assert!(value.get("clustering").is_none());
    }

    #[rstest]
    #[case("cluster", PresentationMode::Cluster)]
    #[case("Heatmap", PresentationMode::Heatmap)]
    #[case(" HEATMAP ", PresentationMode::Heatmap)]
    fn test_parse_mode(#[case] input: &str, #[case] expected: PresentationMode) {
        assert_eq!(input.parse::<PresentationMode>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "hexbin".parse::<PresentationMode>().unwrap_err();
        assert!(err.to_string().contains("Unknown presentation mode"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [PresentationMode::Cluster, PresentationMode::Heatmap] {
            assert_eq!(mode.to_string().parse::<PresentationMode>().unwrap(), mode);
        }
    }
}
